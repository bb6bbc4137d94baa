// DEVICE_ADDRESS is the fixed 7-bit I2C address of the PM2008 sensor.
pub const DEVICE_ADDRESS: u8 = 0x28;

// FRAME_HEADER is the byte that marks the beginning of any frame (command or response).
pub const FRAME_HEADER: u8 = 0x16;

// COMMAND_FRAME_LEN is the size of a command frame sent to the sensor, checksum included.
pub const COMMAND_FRAME_LEN: usize = 7;

// RESPONSE_FRAME_LEN is the size of a measurement frame read back from the sensor.
// The sensor also reports it in the second byte of the frame.
pub const RESPONSE_FRAME_LEN: usize = 32;

// Control mode codes, written in the third byte of a command frame.
pub const CTRL_CLOSE_MEASUREMENT: u8 = 0x01;
pub const CTRL_OPEN_SINGLE_MEASUREMENT: u8 = 0x02;
pub const CTRL_CONTINUOUS_MEASUREMENT: u8 = 0x03;
pub const CTRL_TIMING_MEASUREMENT: u8 = 0x04;
pub const CTRL_DYNAMIC_MEASUREMENT: u8 = 0x05;
pub const CTRL_CALIBRATION_COEFFICIENT: u8 = 0x06;
pub const CTRL_WARM_MODE: u8 = 0x07;

// CONTINUOUS_MEASUREMENT_PARAM is the mode parameter sent along with continuous measurement.
pub const CONTINUOUS_MEASUREMENT_PARAM: u16 = 0xFFFF;

// DEFAULT_CALIBRATION_COEFFICIENT is sent when setting up the calibration coefficient.
pub const DEFAULT_CALIBRATION_COEFFICIENT: u16 = 70;

// DEFAULT_MEASURING_TIME is sent with the timing, dynamic and remaining control modes.
pub const DEFAULT_MEASURING_TIME: u16 = 180;

// Status codes reported in the third byte of a response frame.
pub const STATUS_CLOSE: u8 = 0x01;
pub const STATUS_UNDER_MEASURING: u8 = 0x02;
pub const STATUS_FAILED: u8 = 0x07;
pub const STATUS_DATA_STABLE: u8 = 0x80;
