use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The transport could not be opened at the sensor address.
    TransportOpenFailed,
    /// The command frame could not be written.
    TransportWriteFailed,
    /// No response frame could be read.
    TransportReadFailed,
    /// The response did not start with the frame header, holds the byte received instead.
    FrameHeaderMismatch(u8),
    /// The response announced a frame length other than 32 bytes.
    FrameLengthMismatch(u8),
    /// The trailing checksum byte did not match the XOR of the frame.
    ChecksumMismatch { expected: u8, calculated: u8 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::TransportOpenFailed => f.write_str("failed to open transport"),
            Error::TransportWriteFailed => f.write_str("failed to write command frame"),
            Error::TransportReadFailed => f.write_str("failed to read response frame"),
            Error::FrameHeaderMismatch(header) => {
                write!(f, "unexpected frame header {:#04x}", header)
            }
            Error::FrameLengthMismatch(len) => write!(f, "unexpected frame length {}", len),
            Error::ChecksumMismatch {
                expected,
                calculated,
            } => write!(
                f,
                "bad checksum: expected {:#04x}, calculated {:#04x}",
                expected, calculated
            ),
        }
    }
}
