use core::fmt::Debug;

use embedded_hal_async::i2c::I2c;
use log::debug;

use crate::constants::{COMMAND_FRAME_LEN, RESPONSE_FRAME_LEN};

/// The bus the sensor session talks through.
///
/// A handle is acquired with [`Transport::open`] and handed back to
/// [`Transport::close`] exactly once; the session owns it in between.
#[allow(async_fn_in_trait)]
pub trait Transport {
    /// Per-connection state returned by `open`.
    type Handle;
    /// Error reported by the underlying bus.
    type Error: Debug;

    /// Acquires a handle to the device at `address` on bus `bus`.
    async fn open(&mut self, bus: u8, address: u8) -> Result<Self::Handle, Self::Error>;

    /// Writes a full command frame.
    async fn write(
        &mut self,
        handle: &mut Self::Handle,
        bytes: &[u8; COMMAND_FRAME_LEN],
    ) -> Result<(), Self::Error>;

    /// Fills `buf` with one response frame.
    async fn read(
        &mut self,
        handle: &mut Self::Handle,
        buf: &mut [u8; RESPONSE_FRAME_LEN],
    ) -> Result<(), Self::Error>;

    /// Releases the handle.
    async fn close(&mut self, handle: Self::Handle);
}

/// Handle returned by [`I2cTransport::open`]: the target address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cHandle {
    pub address: u8,
}

/// [`Transport`] over an `embedded-hal-async` I2C bus.
///
/// The peripheral passed in already is the bus, so the bus number given to
/// `open` is only logged.
pub struct I2cTransport<I2C> {
    i2c: I2C,
}

impl<I2C> I2cTransport<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Returns the underlying I2C peripheral.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Transport for I2cTransport<I2C>
where
    I2C: I2c,
{
    type Handle = I2cHandle;
    type Error = I2C::Error;

    async fn open(&mut self, bus: u8, address: u8) -> Result<I2cHandle, I2C::Error> {
        debug!("Using I2C bus {} at address {:02X}", bus, address);
        Ok(I2cHandle { address })
    }

    async fn write(
        &mut self,
        handle: &mut I2cHandle,
        bytes: &[u8; COMMAND_FRAME_LEN],
    ) -> Result<(), I2C::Error> {
        self.i2c.write(handle.address, bytes).await
    }

    async fn read(
        &mut self,
        handle: &mut I2cHandle,
        buf: &mut [u8; RESPONSE_FRAME_LEN],
    ) -> Result<(), I2C::Error> {
        self.i2c.read(handle.address, buf).await
    }

    async fn close(&mut self, handle: I2cHandle) {
        debug!("Released I2C device at address {:02X}", handle.address);
    }
}
