//! Alert tone trait

/// Errors from the tone output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ToneError {
    /// The output rejected the duty cycle change
    Output,
}

/// Trait for the audible alert output
pub trait AlertTone {
    /// Turn the tone on or off
    fn set_tone(&mut self, on: bool) -> Result<(), ToneError>;

    /// Check if the tone is currently on
    fn is_on(&self) -> bool;
}
