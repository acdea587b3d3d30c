//! VL53L0X time-of-flight range sensor (I2C)
//!
//! The VL53L0X measures distance with a 940 nm laser and reports it in
//! millimeters. Most of its register map is undocumented; bring-up is a
//! fixed register sequence that has to be replayed exactly, otherwise the
//! internal state machine never reaches a usable ranging mode.
//!
//! # Protocol
//!
//! - 7-bit address 0x29, standard mode (100 kHz)
//! - Register write: `[reg, data...]` in one transfer
//! - Register read: `[reg]` then a repeated-start read
//! - 16-bit registers are big-endian on the wire
//!
//! # Operation
//!
//! 1. [`Vl53l0x::boot`] replays the bring-up sequence and captures the
//!    stop variable, a per-device calibration byte
//! 2. [`Vl53l0x::start_continuous`] writes the stop variable back and
//!    selects back-to-back or timed ranging
//! 3. [`Vl53l0x::read_distance_cm`] waits for a result and clears the
//!    data-ready latch
//!
//! Every poll is bounded by the configured timeout. The driver never
//! retries: bus errors go straight back to the caller.

use rangeguard_core::reading::{mm_to_cm, Reading, INVALID_DISTANCE_MM};
use rangeguard_hal::{I2cBus, Monotonic};

/// Default I2C address
pub const DEFAULT_ADDRESS: u8 = 0x29;

/// Default poll timeout (ms)
pub const DEFAULT_TIMEOUT_MS: u32 = 1000;

/// Default measurement timing budget (µs)
pub const DEFAULT_TIMING_BUDGET_US: u32 = 33_000;

/// Timing budget to native period units
const BUDGET_US_PER_UNIT: u32 = 1085;

/// VL53L0X register addresses
pub mod reg {
    /// Ranging start / mode select
    pub const SYSRANGE_START: u8 = 0x00;
    /// Sequence step enables
    pub const SYSTEM_SEQUENCE_CONFIG: u8 = 0x01;
    /// Inter-measurement period (16-bit)
    pub const SYSTEM_INTERMEASUREMENT_PERIOD: u8 = 0x04;
    /// Interrupt source configuration
    pub const SYSTEM_INTERRUPT_CONFIG_GPIO: u8 = 0x0A;
    /// Write 0x01 to clear the data-ready latch
    pub const SYSTEM_INTERRUPT_CLEAR: u8 = 0x0B;
    /// Interrupt status, low 3 bits non-zero when a result is ready
    pub const RESULT_INTERRUPT_STATUS: u8 = 0x13;
    /// Range result in millimeters (16-bit)
    pub const RESULT_RANGE_MM: u8 = 0x1E;
    /// Signal rate limit check enables
    pub const MSRC_CONFIG_CONTROL: u8 = 0x60;
    /// Final range signal rate limit (16-bit, 9.7 fixed point)
    pub const FINAL_RANGE_MIN_COUNT_RATE_RTN_LIMIT: u8 = 0x44;
    /// Interrupt pin polarity
    pub const GPIO_HV_MUX_ACTIVE_HIGH: u8 = 0x84;
    /// Power management / private page select
    pub const POWER_MANAGEMENT: u8 = 0x80;
    /// Register page select
    pub const PAGE_SELECT: u8 = 0xFF;
    /// Stop variable (private page)
    pub const STOP_VARIABLE: u8 = 0x91;
    /// NVM access handshake (private page)
    pub const NVM_HANDSHAKE: u8 = 0x83;
    /// NVM control (private page)
    pub const NVM_CONTROL: u8 = 0x81;
    /// NVM address (private page)
    pub const NVM_ADDRESS: u8 = 0x94;
    /// NVM data (private page)
    pub const NVM_DATA: u8 = 0x92;
}

/// Final range signal rate limit: 0.25 MCPS in 9.7 fixed point
const SIGNAL_RATE_LIMIT: u16 = 32;

/// Errors from the range sensor driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Vl53l0xError<E> {
    /// The bus transfer failed
    Bus(E),
    /// The NVM handshake never completed during bring-up
    BootTimeout,
    /// Continuous ranging requested before a successful boot
    NotBooted,
}

impl<E> From<E> for Vl53l0xError<E> {
    fn from(e: E) -> Self {
        Vl53l0xError::Bus(e)
    }
}

/// Register-level transport
///
/// Addresses one device on an [`I2cBus`]. Every read is a selector write
/// followed by a repeated-start read, so the bus is held between the two
/// phases.
pub struct RegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2cBus> RegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Write an 8-bit register
    pub fn write8(&mut self, reg: u8, value: u8) -> Result<(), I2C::Error> {
        self.i2c.write(self.address, &[reg, value])
    }

    /// Write a 16-bit register (big-endian)
    pub fn write16(&mut self, reg: u8, value: u16) -> Result<(), I2C::Error> {
        let [hi, lo] = value.to_be_bytes();
        self.i2c.write(self.address, &[reg, hi, lo])
    }

    /// Read an 8-bit register
    pub fn read8(&mut self, reg: u8) -> Result<u8, I2C::Error> {
        let mut buf = [0u8; 1];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Read a 16-bit register (big-endian)
    pub fn read16(&mut self, reg: u8) -> Result<u16, I2C::Error> {
        let mut buf = [0u8; 2];
        self.i2c.write_read(self.address, &[reg], &mut buf)?;
        Ok(u16::from_be_bytes(buf))
    }

    /// Device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// One step of a register sequence
#[derive(Debug, Clone, Copy)]
enum Step {
    /// Write an 8-bit value
    Write(u8, u8),
    /// Write a 16-bit value
    Write16(u8, u16),
    /// Read-modify-write: OR in bits
    Set(u8, u8),
    /// Read-modify-write: clear bits
    Clear(u8, u8),
    /// Read and ignore the value
    Discard(u8),
    /// Read the stop variable into the calibration
    CaptureStop,
    /// Poll until the register reads non-zero or the timeout elapses
    AwaitNonZero(u8),
    /// Write the timing budget in native units
    TimingBudget(u8),
}

use Step::*;

/// Bring-up sequence
///
/// Order and values matter; the sensor has no documented recovery from a
/// partially applied sequence.
const BOOT_SEQUENCE: &[Step] = &[
    // Capture the stop variable from the private page
    Write(reg::POWER_MANAGEMENT, 0x01),
    Write(reg::PAGE_SELECT, 0x01),
    Write(reg::SYSRANGE_START, 0x00),
    CaptureStop,
    Write(reg::SYSRANGE_START, 0x01),
    Write(reg::PAGE_SELECT, 0x00),
    Write(reg::POWER_MANAGEMENT, 0x00),
    // Disable signal rate checks, set the signal rate limit
    Set(reg::MSRC_CONFIG_CONTROL, 0x12),
    Write16(reg::FINAL_RANGE_MIN_COUNT_RATE_RTN_LIMIT, SIGNAL_RATE_LIMIT),
    Write(reg::SYSTEM_SEQUENCE_CONFIG, 0xFF),
    // NVM access handshake
    Write(reg::POWER_MANAGEMENT, 0x01),
    Write(reg::PAGE_SELECT, 0x01),
    Write(reg::SYSRANGE_START, 0x00),
    Write(reg::PAGE_SELECT, 0x06),
    Set(reg::NVM_HANDSHAKE, 0x04),
    Write(reg::PAGE_SELECT, 0x07),
    Write(reg::NVM_CONTROL, 0x01),
    Write(reg::POWER_MANAGEMENT, 0x01),
    Write(reg::NVM_ADDRESS, 0x6B),
    Write(reg::NVM_HANDSHAKE, 0x00),
    AwaitNonZero(reg::NVM_HANDSHAKE),
    Write(reg::NVM_HANDSHAKE, 0x01),
    Discard(reg::NVM_DATA),
    Write(reg::NVM_CONTROL, 0x00),
    Write(reg::PAGE_SELECT, 0x06),
    Clear(reg::NVM_HANDSHAKE, 0x04),
    Write(reg::PAGE_SELECT, 0x01),
    Write(reg::SYSRANGE_START, 0x01),
    Write(reg::PAGE_SELECT, 0x00),
    Write(reg::POWER_MANAGEMENT, 0x00),
    // New-sample-ready interrupt, active low
    Write(reg::SYSTEM_INTERRUPT_CONFIG_GPIO, 0x04),
    Clear(reg::GPIO_HV_MUX_ACTIVE_HIGH, 0x10),
    Write(reg::SYSTEM_INTERRUPT_CLEAR, 0x01),
    // Sequence steps and timing
    Write(reg::SYSTEM_SEQUENCE_CONFIG, 0xE8),
    TimingBudget(reg::SYSTEM_INTERMEASUREMENT_PERIOD),
    Write(reg::SYSTEM_INTERRUPT_CLEAR, 0x01),
];

/// Driver configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Vl53l0xConfig {
    /// 7-bit I2C address
    pub address: u8,
    /// Deadline for every status poll (ms)
    pub timeout_ms: u32,
    /// Measurement timing budget (µs)
    pub timing_budget_us: u32,
}

impl Default for Vl53l0xConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            timing_budget_us: DEFAULT_TIMING_BUDGET_US,
        }
    }
}

/// State captured by a successful boot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Calibration {
    /// Stop variable read from the private page
    pub stop_variable: u8,
    /// Timing budget programmed during boot (µs)
    pub timing_budget_us: u32,
}

/// Convert a continuous-mode period to native units (x12/13, truncating)
pub fn continuous_period_units(period_ms: u32) -> u16 {
    let units = period_ms as u64 * 12 / 13;
    units.min(u16::MAX as u64) as u16
}

/// Convert a timing budget to native units
pub fn timing_budget_units(budget_us: u32) -> u16 {
    (budget_us / BUDGET_US_PER_UNIT).min(u16::MAX as u32) as u16
}

/// VL53L0X driver
pub struct Vl53l0x<I2C, C> {
    bus: RegisterBus<I2C>,
    clock: C,
    config: Vl53l0xConfig,
    /// Set by the last successful boot
    calibration: Option<Calibration>,
}

impl<I2C: I2cBus, C: Monotonic> Vl53l0x<I2C, C> {
    /// Create a driver; the sensor is not touched until [`boot`](Self::boot)
    pub fn new(i2c: I2C, clock: C, config: Vl53l0xConfig) -> Self {
        Self {
            bus: RegisterBus::new(i2c, config.address),
            clock,
            config,
            calibration: None,
        }
    }

    /// Replay the bring-up sequence
    ///
    /// On success the stop variable is stored for
    /// [`start_continuous`](Self::start_continuous). Any earlier
    /// calibration is dropped first, so a failed boot leaves the driver
    /// unbooted even if a previous boot succeeded.
    pub fn boot(&mut self) -> Result<Calibration, Vl53l0xError<I2C::Error>> {
        self.calibration = None;
        let mut stop_variable = 0;

        for step in BOOT_SEQUENCE {
            match *step {
                Write(r, v) => self.bus.write8(r, v)?,
                Write16(r, v) => self.bus.write16(r, v)?,
                Set(r, bits) => {
                    let v = self.bus.read8(r)?;
                    self.bus.write8(r, v | bits)?;
                }
                Clear(r, bits) => {
                    let v = self.bus.read8(r)?;
                    self.bus.write8(r, v & !bits)?;
                }
                Discard(r) => {
                    self.bus.read8(r)?;
                }
                CaptureStop => stop_variable = self.bus.read8(reg::STOP_VARIABLE)?,
                AwaitNonZero(r) => {
                    if !self.poll(r, 0xFF)? {
                        return Err(Vl53l0xError::BootTimeout);
                    }
                }
                TimingBudget(r) => {
                    self.bus
                        .write16(r, timing_budget_units(self.config.timing_budget_us))?;
                }
            }
        }

        let calibration = Calibration {
            stop_variable,
            timing_budget_us: self.config.timing_budget_us,
        };
        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Start continuous ranging
    ///
    /// `period_ms == 0` ranges back-to-back; anything else uses the timed
    /// mode with that inter-measurement period.
    pub fn start_continuous(&mut self, period_ms: u32) -> Result<(), Vl53l0xError<I2C::Error>> {
        let calibration = self.calibration.ok_or(Vl53l0xError::NotBooted)?;

        self.bus.write8(reg::POWER_MANAGEMENT, 0x01)?;
        self.bus.write8(reg::PAGE_SELECT, 0x01)?;
        self.bus.write8(reg::SYSRANGE_START, 0x00)?;
        self.bus.write8(reg::STOP_VARIABLE, calibration.stop_variable)?;
        self.bus.write8(reg::SYSRANGE_START, 0x01)?;
        self.bus.write8(reg::PAGE_SELECT, 0x00)?;
        self.bus.write8(reg::POWER_MANAGEMENT, 0x00)?;

        if period_ms != 0 {
            self.bus.write16(
                reg::SYSTEM_INTERMEASUREMENT_PERIOD,
                continuous_period_units(period_ms),
            )?;
            self.bus.write8(reg::SYSRANGE_START, 0x04)?;
        } else {
            self.bus.write8(reg::SYSRANGE_START, 0x02)?;
        }
        Ok(())
    }

    /// Read the raw range in millimeters
    ///
    /// Returns [`INVALID_DISTANCE_MM`] if no result arrives before the
    /// timeout. The data-ready latch is cleared after every result.
    pub fn read_range_mm(&mut self) -> Result<u16, Vl53l0xError<I2C::Error>> {
        if !self.poll(reg::RESULT_INTERRUPT_STATUS, 0x07)? {
            return Ok(INVALID_DISTANCE_MM);
        }

        let mm = self.bus.read16(reg::RESULT_RANGE_MM)?;
        self.bus.write8(reg::SYSTEM_INTERRUPT_CLEAR, 0x01)?;
        Ok(mm)
    }

    /// Read the distance in whole centimeters
    ///
    /// `None` means no usable reading: a poll timeout or a raw value at or
    /// above the 2001 mm sentinel.
    pub fn read_distance_cm(&mut self) -> Result<Option<u16>, Vl53l0xError<I2C::Error>> {
        Ok(mm_to_cm(self.read_range_mm()?))
    }

    /// Take a timestamped reading
    pub fn measure(&mut self) -> Result<Reading, Vl53l0xError<I2C::Error>> {
        let mm = self.read_range_mm()?;
        Ok(Reading::from_mm(mm, self.clock.now_ms()))
    }

    /// Poll `reg` until any bit in `mask` is set
    ///
    /// Returns `Ok(false)` once the deadline passes.
    fn poll(&mut self, reg: u8, mask: u8) -> Result<bool, I2C::Error> {
        let deadline = self.clock.deadline(self.config.timeout_ms);
        loop {
            if self.bus.read8(reg)? & mask != 0 {
                return Ok(true);
            }
            if deadline.is_expired(self.clock.now_ms()) {
                return Ok(false);
            }
        }
    }

    /// Check if the sensor has been booted
    pub fn is_booted(&self) -> bool {
        self.calibration.is_some()
    }

    /// Calibration from the last successful boot
    pub fn calibration(&self) -> Option<Calibration> {
        self.calibration
    }

    pub fn config(&self) -> &Vl53l0xConfig {
        &self.config
    }

    /// Release the bus and clock
    pub fn release(self) -> (I2C, C) {
        (self.bus.release(), self.clock)
    }
}
