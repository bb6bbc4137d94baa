use log::debug;

use crate::constants::*;
use crate::{Config, Error};

/// XOR of every byte of `bytes`, seeded with the first one.
pub fn xor_checksum(bytes: &[u8]) -> u8 {
    match bytes.split_first() {
        Some((&first, rest)) => rest.iter().fold(first, |check, &b| check ^ b),
        None => 0,
    }
}

/// A 7-byte command frame sent to the sensor.
///
/// Layout: header, frame length, control mode, mode parameter (big-endian),
/// reserved byte, checksum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    bytes: [u8; COMMAND_FRAME_LEN],
}

impl CommandFrame {
    /// Builds the command frame for the control mode of `config`.
    pub fn new(config: &Config) -> Self {
        let [param_msb, param_lsb] = config.mode_parameter().to_be_bytes();
        let mut frame = CommandFrame {
            bytes: [
                FRAME_HEADER,
                COMMAND_FRAME_LEN as u8,
                config.control_mode.code(),
                param_msb,
                param_lsb,
                0x00, // Reserved
                0x00, // Placeholder for checksum
            ],
        };
        frame.update_checksum();
        frame
    }

    // Recomputes the trailing checksum from the first six bytes.
    fn update_checksum(&mut self) {
        self.bytes[COMMAND_FRAME_LEN - 1] = xor_checksum(&self.bytes[..COMMAND_FRAME_LEN - 1]);
    }

    pub fn control_mode(&self) -> u8 {
        self.bytes[2]
    }

    pub fn mode_parameter(&self) -> u16 {
        u16::from_be_bytes([self.bytes[3], self.bytes[4]])
    }

    pub fn checksum(&self) -> u8 {
        self.bytes[COMMAND_FRAME_LEN - 1]
    }

    pub fn as_bytes(&self) -> &[u8; COMMAND_FRAME_LEN] {
        &self.bytes
    }
}

/// Sensor status reported in a response frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Measurement is closed.
    Closed,
    /// Measurement in progress, values may not have settled yet.
    UnderMeasuring,
    /// The sensor reported a failure.
    Failed,
    /// Values are stable.
    DataStable,
    /// Any other status byte.
    Unknown(u8),
}

impl From<u8> for Status {
    fn from(value: u8) -> Self {
        match value {
            STATUS_CLOSE => Status::Closed,
            STATUS_UNDER_MEASURING => Status::UnderMeasuring,
            STATUS_FAILED => Status::Failed,
            STATUS_DATA_STABLE => Status::DataStable,
            other => Status::Unknown(other),
        }
    }
}

/// A measurement decoded from a 32-byte response frame.
///
/// Mass concentrations are in µg/m³, referenced to either the GRIMM or the TSI
/// standard. Particle counts are per liter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub status: Status,
    /// Control mode the sensor is measuring in, echoed back.
    pub measuring_mode: u16,
    pub calibration_coefficient: u16,
    pub pm1_0_grimm: u16,
    pub pm2_5_grimm: u16,
    pub pm10_grimm: u16,
    pub pm1_0_tsi: u16,
    pub pm2_5_tsi: u16,
    pub pm10_tsi: u16,
    pub particles_0_3um: u16,
    pub particles_0_5um: u16,
    pub particles_1um: u16,
    pub particles_2_5um: u16,
    pub particles_5um: u16,
    pub particles_10um: u16,
}

impl Measurement {
    /// Validates a raw response frame and decodes it.
    ///
    /// The header, the length byte and the trailing checksum are checked in that
    /// order; nothing is decoded unless all three match.
    pub fn parse(frame: &[u8; RESPONSE_FRAME_LEN]) -> Result<Self, Error> {
        if frame[0] != FRAME_HEADER {
            log::error!(
                "Frame header is {:02X}, expected {:02X}. Frame: {:02X?}",
                frame[0],
                FRAME_HEADER,
                frame
            );
            return Err(Error::FrameHeaderMismatch(frame[0]));
        }

        if usize::from(frame[1]) != RESPONSE_FRAME_LEN {
            log::error!(
                "Frame length is {}, expected {}. Frame: {:02X?}",
                frame[1],
                RESPONSE_FRAME_LEN,
                frame
            );
            return Err(Error::FrameLengthMismatch(frame[1]));
        }

        let expected = frame[RESPONSE_FRAME_LEN - 1];
        let calculated = xor_checksum(&frame[..RESPONSE_FRAME_LEN - 1]);
        if expected != calculated {
            log::error!(
                "Bad checksum: Calculated {:02X}, Received {:02X}. Frame: {:02X?}",
                calculated,
                expected,
                frame
            );
            return Err(Error::ChecksumMismatch {
                expected,
                calculated,
            });
        }

        let word = |idx: usize| u16::from_be_bytes([frame[idx], frame[idx + 1]]);
        let measurement = Measurement {
            status: Status::from(frame[2]),
            measuring_mode: word(3),
            calibration_coefficient: word(5),
            pm1_0_grimm: word(7),
            pm2_5_grimm: word(9),
            pm10_grimm: word(11),
            pm1_0_tsi: word(13),
            pm2_5_tsi: word(15),
            pm10_tsi: word(17),
            particles_0_3um: word(19),
            particles_0_5um: word(21),
            particles_1um: word(23),
            particles_2_5um: word(25),
            particles_5um: word(27),
            particles_10um: word(29),
        };

        if measurement.status == Status::Failed {
            log::warn!("Sensor reports a failed measurement status");
        }

        debug!(
            "Processed frame - status: {:?}, PM1.0: {}, PM2.5: {}, PM10: {} (TSI)",
            measurement.status, measurement.pm1_0_tsi, measurement.pm2_5_tsi, measurement.pm10_tsi
        );
        Ok(measurement)
    }
}
