//! Range sensor drivers

pub mod vl53l0x;

pub use vl53l0x::{Calibration, RegisterBus, Vl53l0x, Vl53l0xConfig, Vl53l0xError};
