#![cfg_attr(not(test), no_std)]

use log::debug;

mod constants;
pub use constants::*;

mod error;
pub use error::*;

mod config;
pub use config::*;

mod frame;
pub use frame::*;

mod transport;
pub use transport::*;

/// Represents the state of a sensor session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No transport handle is held.
    Closed,
    /// The transport is open but the command frame has not been sent yet.
    CommandPending,
    /// The command frame was sent, polls only read.
    Streaming,
}

/// Represents a PM2008 particulate matter sensor.
///
/// The session owns the transport and the handle opened on it. It is meant to be
/// polled periodically with [`Pm2008::read_measurement`]: the first poll opens
/// the transport and sends the command frame, every later poll only reads a
/// response frame. Errors never close the session, the next poll retries.
///
/// # Type Parameters
///
/// * `T`: The transport used to reach the sensor. It must implement [`Transport`].
pub struct Pm2008<T: Transport> {
    transport: T,
    config: Config,
    handle: Option<T::Handle>,
    command_sent: bool,
}

impl<T> Pm2008<T>
where
    T: Transport,
{
    /// Creates a new, closed `Pm2008` session.
    ///
    /// # Arguments
    ///
    /// * `transport`: The transport used to reach the sensor.
    /// * `config`: The sensor configuration.
    pub fn new(transport: T, config: Config) -> Self {
        Self {
            transport,
            config,
            handle: None,
            command_sent: false,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether the command frame was sent since the session was last opened.
    pub fn command_sent(&self) -> bool {
        self.command_sent
    }

    pub fn state(&self) -> SessionState {
        match (self.is_open(), self.command_sent) {
            (false, _) => SessionState::Closed,
            (true, false) => SessionState::CommandPending,
            (true, true) => SessionState::Streaming,
        }
    }

    /// Opens the transport to the sensor unless the session is already open.
    ///
    /// On success the command frame is marked as not sent, so the next read
    /// sends it. On failure the session stays closed.
    pub async fn open_if_needed(&mut self, bus: u8) -> Result<(), Error> {
        if self.handle.is_some() {
            return Ok(());
        }

        let handle = self
            .transport
            .open(bus, self.config.address)
            .await
            .map_err(|e| {
                log::error!(
                    "Failed to open bus {} at address {:02X}: {:?}",
                    bus,
                    self.config.address,
                    e
                );
                Error::TransportOpenFailed
            })?;

        self.handle = Some(handle);
        self.command_sent = false;
        debug!("Sensor session opened on bus {}", bus);
        Ok(())
    }

    /// Reads a single measurement from the sensor.
    ///
    /// This involves:
    /// - Opening the session if needed.
    /// - Sending the command frame, once per opened session.
    /// - Reading and validating a 32-byte response frame.
    ///
    /// Validation failures are returned as errors and leave the session as is.
    pub async fn read_measurement(&mut self, bus: u8) -> Result<Measurement, Error> {
        self.open_if_needed(bus).await?;

        let command = CommandFrame::new(&self.config);
        let handle = self.handle.as_mut().ok_or(Error::TransportOpenFailed)?;

        if !self.command_sent {
            debug!("Executing command: {:02X?}", command.as_bytes());
            self.transport
                .write(handle, command.as_bytes())
                .await
                .map_err(|e| {
                    log::error!("Failed to write command frame: {:?}", e);
                    Error::TransportWriteFailed
                })?;
            self.command_sent = true;
        }

        let mut buffer = [0u8; RESPONSE_FRAME_LEN];
        self.transport
            .read(handle, &mut buffer)
            .await
            .map_err(|e| {
                log::error!("Failed to read response frame: {:?}", e);
                Error::TransportReadFailed
            })?;
        debug!("Received frame: {:02X?}", buffer);

        Measurement::parse(&buffer)
    }

    /// Reads the PM10 mass concentration (TSI standard) in µg/m³.
    pub async fn read_pm10(&mut self, bus: u8) -> Result<u16, Error> {
        self.read_measurement(bus).await.map(|m| m.pm10_tsi)
    }

    /// Closes the session if it is open.
    ///
    /// The command frame will be sent again after the session is reopened.
    pub async fn close(&mut self) {
        self.command_sent = false;
        if let Some(handle) = self.handle.take() {
            debug!("Sensor session is closing");
            self.transport.close(handle).await;
        }
    }

    /// Closes the session and returns the transport.
    pub async fn release(mut self) -> T {
        self.close().await;
        self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::tests::{response_frame, WORDS};
    use futures::executor::block_on;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct FakeError;

    // Transport that records every call and replays queued responses.
    #[derive(Default)]
    struct FakeTransport {
        opens: Vec<(u8, u8)>,
        writes: Vec<[u8; COMMAND_FRAME_LEN]>,
        reads: usize,
        closes: Vec<u32>,
        responses: VecDeque<[u8; RESPONSE_FRAME_LEN]>,
        next_handle: u32,
        fail_open: bool,
        fail_write: bool,
        fail_read: bool,
    }

    impl FakeTransport {
        fn with_responses(count: usize) -> Self {
            Self {
                responses: (0..count)
                    .map(|_| response_frame(STATUS_DATA_STABLE, WORDS))
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl Transport for FakeTransport {
        type Handle = u32;
        type Error = FakeError;

        async fn open(&mut self, bus: u8, address: u8) -> Result<u32, FakeError> {
            if self.fail_open {
                return Err(FakeError);
            }
            self.opens.push((bus, address));
            self.next_handle += 1;
            Ok(self.next_handle)
        }

        async fn write(
            &mut self,
            _handle: &mut u32,
            bytes: &[u8; COMMAND_FRAME_LEN],
        ) -> Result<(), FakeError> {
            if self.fail_write {
                return Err(FakeError);
            }
            self.writes.push(*bytes);
            Ok(())
        }

        async fn read(
            &mut self,
            _handle: &mut u32,
            buf: &mut [u8; RESPONSE_FRAME_LEN],
        ) -> Result<(), FakeError> {
            if self.fail_read {
                return Err(FakeError);
            }
            self.reads += 1;
            *buf = self.responses.pop_front().ok_or(FakeError)?;
            Ok(())
        }

        async fn close(&mut self, handle: u32) {
            self.closes.push(handle);
        }
    }

    fn session(transport: FakeTransport) -> Pm2008<FakeTransport> {
        Pm2008::new(transport, Config::default())
    }

    #[test]
    fn starts_closed() {
        let sensor = session(FakeTransport::default());
        assert_eq!(sensor.state(), SessionState::Closed);
        assert!(!sensor.is_open());
        assert!(!sensor.command_sent());
    }

    #[test]
    fn open_if_needed_opens_once() {
        let mut sensor = session(FakeTransport::default());
        block_on(sensor.open_if_needed(1)).unwrap();
        block_on(sensor.open_if_needed(1)).unwrap();
        assert_eq!(sensor.state(), SessionState::CommandPending);
        assert_eq!(sensor.transport.opens, vec![(1, DEVICE_ADDRESS)]);
    }

    #[test]
    fn open_failure_leaves_session_closed() {
        let mut sensor = session(FakeTransport {
            fail_open: true,
            ..Default::default()
        });
        assert_eq!(
            block_on(sensor.read_measurement(1)),
            Err(Error::TransportOpenFailed)
        );
        assert_eq!(sensor.state(), SessionState::Closed);
        assert!(sensor.transport.writes.is_empty());

        sensor.transport.fail_open = false;
        block_on(sensor.open_if_needed(1)).unwrap();
        assert!(sensor.is_open());
    }

    #[test]
    fn first_read_sends_command_then_streams() {
        let mut sensor = session(FakeTransport::with_responses(1));
        let m = block_on(sensor.read_measurement(1)).unwrap();
        assert_eq!(m.pm10_tsi, 0x1234);
        assert_eq!(m.status, Status::DataStable);
        assert_eq!(sensor.state(), SessionState::Streaming);
        assert_eq!(
            sensor.transport.writes,
            vec![[0x16, 0x07, 0x03, 0xFF, 0xFF, 0x00, 0x12]]
        );
    }

    #[test]
    fn command_is_written_once_per_session() {
        let mut sensor = session(FakeTransport::with_responses(20));
        for _ in 0..20 {
            block_on(sensor.read_measurement(1)).unwrap();
        }
        assert_eq!(sensor.transport.writes.len(), 1);
        assert_eq!(sensor.transport.reads, 20);
        assert_eq!(sensor.transport.opens.len(), 1);
    }

    #[test]
    fn write_failure_is_retried_on_next_poll() {
        let mut sensor = session(FakeTransport {
            fail_write: true,
            ..FakeTransport::with_responses(1)
        });
        assert_eq!(
            block_on(sensor.read_measurement(1)),
            Err(Error::TransportWriteFailed)
        );
        assert_eq!(sensor.state(), SessionState::CommandPending);
        assert_eq!(sensor.transport.reads, 0);

        sensor.transport.fail_write = false;
        block_on(sensor.read_measurement(1)).unwrap();
        assert_eq!(sensor.transport.writes.len(), 1);
        assert_eq!(sensor.state(), SessionState::Streaming);
    }

    #[test]
    fn read_failure_keeps_streaming() {
        let mut sensor = session(FakeTransport {
            fail_read: true,
            ..Default::default()
        });
        assert_eq!(
            block_on(sensor.read_measurement(1)),
            Err(Error::TransportReadFailed)
        );
        assert_eq!(sensor.state(), SessionState::Streaming);
        assert_eq!(sensor.transport.writes.len(), 1);
    }

    #[test]
    fn wrong_header_is_rejected_without_state_change() {
        let mut bad = response_frame(STATUS_DATA_STABLE, WORDS);
        bad[0] = 0x42;
        bad[31] = xor_checksum(&bad[..31]);
        let mut transport = FakeTransport::with_responses(1);
        transport.responses.push_front(bad);

        let mut sensor = session(transport);
        assert_eq!(
            block_on(sensor.read_measurement(1)),
            Err(Error::FrameHeaderMismatch(0x42))
        );
        assert_eq!(sensor.state(), SessionState::Streaming);
        assert!(sensor.transport.closes.is_empty());

        // Next poll reads again without resending the command.
        block_on(sensor.read_measurement(1)).unwrap();
        assert_eq!(sensor.transport.writes.len(), 1);
        assert_eq!(sensor.transport.opens.len(), 1);
    }

    #[test]
    fn corrupted_checksum_returns_no_measurement() {
        let mut bad = response_frame(STATUS_DATA_STABLE, WORDS);
        bad[31] ^= 0x01;
        let mut transport = FakeTransport::default();
        transport.responses.push_back(bad);

        let mut sensor = session(transport);
        assert!(matches!(
            block_on(sensor.read_measurement(1)),
            Err(Error::ChecksumMismatch { .. })
        ));
        assert_eq!(sensor.state(), SessionState::Streaming);
    }

    #[test]
    fn close_resets_command_and_reopens() {
        let mut sensor = session(FakeTransport::with_responses(2));
        block_on(sensor.read_measurement(1)).unwrap();

        block_on(sensor.close());
        assert_eq!(sensor.state(), SessionState::Closed);
        assert!(!sensor.command_sent());
        assert_eq!(sensor.transport.closes, vec![1]);

        block_on(sensor.read_measurement(1)).unwrap();
        assert_eq!(sensor.transport.opens.len(), 2);
        assert_eq!(sensor.transport.writes.len(), 2);
        assert_eq!(sensor.state(), SessionState::Streaming);
    }

    #[test]
    fn close_is_idempotent() {
        let mut sensor = session(FakeTransport::default());
        block_on(sensor.close());
        block_on(sensor.open_if_needed(1)).unwrap();
        block_on(sensor.close());
        block_on(sensor.close());
        assert_eq!(sensor.transport.closes, vec![1]);
    }

    #[test]
    fn read_pm10_surfaces_tsi_value() {
        let mut sensor = session(FakeTransport::with_responses(1));
        assert_eq!(block_on(sensor.read_pm10(1)), Ok(0x1234));
    }

    #[test]
    fn calibration_mode_sends_coefficient() {
        let config = Config::new(ControlMode::CalibrationCoefficient).calibration_coefficient(0x0102);
        let mut sensor = Pm2008::new(FakeTransport::with_responses(1), config);
        block_on(sensor.read_measurement(3)).unwrap();
        let sent = sensor.transport.writes[0];
        assert_eq!(&sent[..6], &[0x16, 0x07, 0x06, 0x01, 0x02, 0x00]);
        assert_eq!(sent[6], xor_checksum(&sent[..6]));
        assert_eq!(sensor.transport.opens, vec![(3, DEVICE_ADDRESS)]);
    }

    #[test]
    fn release_closes_and_returns_transport() {
        let mut sensor = session(FakeTransport::default());
        block_on(sensor.open_if_needed(1)).unwrap();
        let transport = block_on(sensor.release());
        assert_eq!(transport.closes, vec![1]);
    }
}
