//! Hardware driver implementations
//!
//! This crate provides concrete implementations for the distance monitor
//! hardware, built on the traits in rangeguard-hal and rangeguard-core:
//!
//! - Range sensor (VL53L0X time-of-flight over I2C)
//! - OLED panel (SSD1306 over I2C)
//! - Indicator lights (two GPIO LEDs)
//! - Alert buzzer (PWM square wave)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod buzzer;
pub mod display;
pub mod indicator;
pub mod sensor;
