//! Alert tone drivers

pub mod pwm;

pub use pwm::PwmBuzzer;
