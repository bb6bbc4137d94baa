use crate::constants::*;

/// Represents the control mode requested from the PM2008 sensor.
///
/// The control mode selects what the sensor should do once the command frame is
/// received, and how the 16-bit mode parameter of that frame is interpreted.
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum ControlMode {
    /// Stop measuring.
    CloseMeasurement,
    /// Take a single measurement.
    OpenSingleMeasurement,
    /// Measure continuously, the sensor keeps streaming frames after the first command.
    ContinuousMeasurement,
    /// Measure for the configured measuring time.
    TimingMeasurement,
    /// Dynamic measurement.
    DynamicMeasurement,
    /// Set the calibration coefficient.
    CalibrationCoefficient,
    /// Warm-up mode.
    WarmMode,
}

impl ControlMode {
    /// Returns the protocol code written in the control-mode byte.
    pub fn code(self) -> u8 {
        match self {
            ControlMode::CloseMeasurement => CTRL_CLOSE_MEASUREMENT,
            ControlMode::OpenSingleMeasurement => CTRL_OPEN_SINGLE_MEASUREMENT,
            ControlMode::ContinuousMeasurement => CTRL_CONTINUOUS_MEASUREMENT,
            ControlMode::TimingMeasurement => CTRL_TIMING_MEASUREMENT,
            ControlMode::DynamicMeasurement => CTRL_DYNAMIC_MEASUREMENT,
            ControlMode::CalibrationCoefficient => CTRL_CALIBRATION_COEFFICIENT,
            ControlMode::WarmMode => CTRL_WARM_MODE,
        }
    }
}

/// Configuration settings for the PM2008 sensor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Config {
    /// The 7-bit I2C address of the sensor.
    pub address: u8,
    /// The control mode sent in the command frame.
    pub control_mode: ControlMode,
    /// Mode parameter used with `ControlMode::CalibrationCoefficient`.
    pub calibration_coefficient: u16,
    /// Mode parameter used with every mode other than continuous measurement and calibration.
    pub measuring_time: u16,
}

impl Config {
    /// Creates a new `Config` instance for the given control mode, using the
    /// default address and mode parameters.
    pub fn new(control_mode: ControlMode) -> Config {
        Config {
            control_mode,
            ..Config::default()
        }
    }

    /// Sets the I2C address for the configuration.
    pub fn address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Sets the control mode for the configuration.
    pub fn control_mode(mut self, control_mode: ControlMode) -> Self {
        self.control_mode = control_mode;
        self
    }

    /// Sets the calibration coefficient for the configuration.
    pub fn calibration_coefficient(mut self, coefficient: u16) -> Self {
        self.calibration_coefficient = coefficient;
        self
    }

    /// Sets the measuring time for the configuration.
    pub fn measuring_time(mut self, measuring_time: u16) -> Self {
        self.measuring_time = measuring_time;
        self
    }

    /// Returns the 16-bit value sent in the mode-parameter field of the command
    /// frame for the configured control mode.
    pub fn mode_parameter(&self) -> u16 {
        match self.control_mode {
            ControlMode::ContinuousMeasurement => CONTINUOUS_MEASUREMENT_PARAM,
            ControlMode::CalibrationCoefficient => self.calibration_coefficient,
            _ => self.measuring_time,
        }
    }
}

/// Provides default configuration values for the PM2008 sensor.
impl Default for Config {
    /// Returns the default configuration.
    ///
    /// The default configuration addresses the sensor at `0x28` and requests
    /// continuous measurement.
    fn default() -> Config {
        Config {
            address: DEVICE_ADDRESS,
            control_mode: ControlMode::ContinuousMeasurement,
            calibration_coefficient: DEFAULT_CALIBRATION_COEFFICIENT,
            measuring_time: DEFAULT_MEASURING_TIME,
        }
    }
}
