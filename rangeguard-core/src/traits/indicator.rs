//! Indicator light trait

use crate::reading::OperatingStatus;

/// What the indicator lights show
///
/// `Open` and `Close` are mutually exclusive; `Off` is used for INVALID
/// and OUT_OF_RANGE readings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorState {
    #[default]
    Off,
    Open,
    Close,
}

impl From<OperatingStatus> for IndicatorState {
    fn from(status: OperatingStatus) -> Self {
        match status {
            OperatingStatus::Open => IndicatorState::Open,
            OperatingStatus::Close => IndicatorState::Close,
        }
    }
}

/// Trait for the indicator lights
pub trait IndicatorLights {
    /// Switch the lights to `state`
    fn show(&mut self, state: IndicatorState);

    /// Currently shown state
    fn state(&self) -> IndicatorState;
}
