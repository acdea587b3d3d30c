//! Indicator light drivers

pub mod gpio;

pub use gpio::GpioIndicators;
