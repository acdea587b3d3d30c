//! Collaborator traits
//!
//! These traits define the interface between the control loop and the
//! output hardware. The loop only invokes them; none of them feed back
//! into sensor logic.

pub mod display;
pub mod indicator;
pub mod log;
pub mod tone;

pub use display::{DisplayError, DisplayRenderer};
pub use indicator::{IndicatorLights, IndicatorState};
pub use log::{LogError, LogSink};
pub use tone::{AlertTone, ToneError};
