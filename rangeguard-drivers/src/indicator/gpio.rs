//! GPIO indicator lights
//!
//! Two LEDs, one per operating status. At most one is lit at a time; both
//! are dark for INVALID and OUT_OF_RANGE readings.

use rangeguard_core::traits::{IndicatorLights, IndicatorState};
use rangeguard_hal::OutputPin;

/// Indicator lights on two GPIO pins
///
/// The pins can be configured as active-high (default) or active-low.
pub struct GpioIndicators<O, C> {
    /// Lit for OPEN
    open_pin: O,
    /// Lit for CLOSE
    close_pin: C,
    /// If true, LED on = pin LOW
    inverted: bool,
    state: IndicatorState,
}

impl<O: OutputPin, C: OutputPin> GpioIndicators<O, C> {
    /// Create the indicators, both dark
    ///
    /// # Arguments
    /// - `open_pin`: LED lit while the status is OPEN
    /// - `close_pin`: LED lit while the status is CLOSE
    /// - `inverted`: If true, LEDs are on when the pin is LOW
    pub fn new(open_pin: O, close_pin: C, inverted: bool) -> Self {
        let mut lights = Self {
            open_pin,
            close_pin,
            inverted,
            state: IndicatorState::Off,
        };
        lights.show(IndicatorState::Off);
        lights
    }

    /// Create indicators with active-high outputs
    pub fn new_active_high(open_pin: O, close_pin: C) -> Self {
        Self::new(open_pin, close_pin, false)
    }

    fn drive(&mut self, open_on: bool, close_on: bool) {
        // Turn off before turning on so both are never lit together
        if !open_on {
            self.open_pin.set_state(self.inverted);
        }
        if !close_on {
            self.close_pin.set_state(self.inverted);
        }
        if open_on {
            self.open_pin.set_state(!self.inverted);
        }
        if close_on {
            self.close_pin.set_state(!self.inverted);
        }
    }
}

impl<O: OutputPin, C: OutputPin> IndicatorLights for GpioIndicators<O, C> {
    fn show(&mut self, state: IndicatorState) {
        match state {
            IndicatorState::Off => self.drive(false, false),
            IndicatorState::Open => self.drive(true, false),
            IndicatorState::Close => self.drive(false, true),
        }
        self.state = state;
    }

    fn state(&self) -> IndicatorState {
        self.state
    }
}
