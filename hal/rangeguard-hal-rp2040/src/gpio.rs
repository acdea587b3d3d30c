//! GPIO outputs

use embassy_rp::gpio::{Level, Output, Pin};
use embassy_rp::Peri;
use rangeguard_hal::OutputPin;

/// Push-pull output implementing the shared `OutputPin` trait
pub struct Rp2040Output<'d> {
    pin: Output<'d>,
}

impl<'d> Rp2040Output<'d> {
    /// Configure `pin` as an output, initially low
    pub fn new(pin: Peri<'d, impl Pin>) -> Self {
        Self {
            pin: Output::new(pin, Level::Low),
        }
    }
}

impl OutputPin for Rp2040Output<'_> {
    fn set_high(&mut self) {
        self.pin.set_high();
    }

    fn set_low(&mut self) {
        self.pin.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.pin.is_set_high()
    }
}
