//! I2C bus abstractions
//!
//! Provides the two-wire master operations the sensor driver is built on.
//! Any `embedded_hal::i2c::I2c` implementation is an [`I2cBus`] through a
//! blanket impl, so chip HALs usually need no extra glue.

/// I2C bus master
///
/// Provides basic I2C read/write operations for communicating with
/// peripheral devices. All calls block until the transfer completes.
pub trait I2cBus {
    /// Error type for I2C operations
    type Error: core::fmt::Debug;

    /// Write data to a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `data` - Bytes to write
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;

    /// Read data from a device at the given address
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `buf` - Buffer to read into
    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Write then read in a single transaction (repeated start)
    ///
    /// The bus is held between the two phases, which is how a register
    /// selector is written before its data is read back.
    ///
    /// # Arguments
    /// * `address` - 7-bit I2C address
    /// * `write_data` - Bytes to write (typically register address)
    /// * `read_buf` - Buffer to read into
    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error>;
}

impl<T> I2cBus for T
where
    T: embedded_hal::i2c::I2c,
{
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::write(self, address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::read(self, address, buf)
    }

    fn write_read(
        &mut self,
        address: u8,
        write_data: &[u8],
        read_buf: &mut [u8],
    ) -> Result<(), Self::Error> {
        embedded_hal::i2c::I2c::write_read(self, address, write_data, read_buf)
    }
}

/// I2C configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz), used for the range sensor
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz), used for the OLED panel
    pub const FAST: Self = Self { frequency: 400_000 };
}
