//! RP2040-specific HAL for the distance monitor firmware
//!
//! This crate provides RP2040 implementations of the shared
//! `rangeguard-hal` traits, plus RP2040-specific functionality:
//!
//! - GPIO outputs for the indicator LEDs
//! - Monotonic clock backed by the embassy time driver
//! - PWM slice configuration for the alert buzzer
//! - Flash-backed distance log (implements `rangeguard_hal::RecordLog`)

#![no_std]

pub mod flash;
pub mod gpio;
pub mod pwm;
pub mod time;

pub use flash::{flash_log, FlashLog};
pub use gpio::Rp2040Output;
pub use time::EmbassyClock;
