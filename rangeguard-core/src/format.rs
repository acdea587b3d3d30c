//! Text formatting for the display panel and the distance log
//!
//! Values of a metre or more are shown in metres with two decimals, shorter
//! ones as whole centimeters. All formatting is integer-only.

use core::fmt::{self, Write};

use heapless::String;

use crate::reading::{Classification, OperatingStatus};

/// Characters per display line (128 px / 6 px font)
pub const LINE_LEN: usize = 21;

/// Default first display line
pub const DEFAULT_TITLE: &str = "DISTANCE MONITOR";

/// First line written to the log each session
pub const LOG_HEADER: &str = "Time,Distance,Unit,Status";

/// Maximum length of one formatted log record
pub const MAX_RECORD_LEN: usize = 48;

/// Unit a distance is presented in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Unit {
    Centimeters,
    Meters,
    /// No valid distance
    Error,
}

impl Unit {
    /// Unit symbol for the display and the terminal
    pub fn symbol(self) -> &'static str {
        match self {
            Unit::Centimeters => "cm",
            Unit::Meters => "m",
            Unit::Error => "",
        }
    }

    /// Unit column of the log
    pub fn log_symbol(self) -> &'static str {
        match self {
            Unit::Error => "-",
            other => other.symbol(),
        }
    }
}

/// A distance rendered as value text plus unit
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DistanceText {
    pub value: String<8>,
    pub unit: Unit,
}

impl DistanceText {
    /// Format a centimeter reading (`None` is the INVALID reading)
    pub fn from_cm(distance_cm: Option<u16>) -> Self {
        let mut value = String::new();
        let unit = match distance_cm {
            None => {
                let _ = value.push_str("ERROR");
                Unit::Error
            }
            Some(cm) if cm >= 100 => {
                let _ = write!(value, "{}.{:02}", cm / 100, cm % 100);
                Unit::Meters
            }
            Some(cm) => {
                let _ = write!(value, "{}", cm);
                Unit::Centimeters
            }
        };
        Self { value, unit }
    }
}

/// Format elapsed milliseconds as `MM:SS`
///
/// Minutes are not wrapped, so long sessions print three or more digits.
pub fn format_elapsed(elapsed_ms: u64) -> String<12> {
    let mut out = String::new();
    let minutes = elapsed_ms / 60_000;
    let seconds = (elapsed_ms / 1000) % 60;
    let _ = write!(out, "{:02}:{:02}", minutes, seconds);
    out
}

/// The three-line payload shown on the output panel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    pub title: String<LINE_LEN>,
    pub distance: String<LINE_LEN>,
    pub status: String<LINE_LEN>,
}

impl Frame {
    /// Build the frame for one classified reading
    ///
    /// `status` is the current operating status, which INVALID and
    /// OUT_OF_RANGE readings leave unchanged.
    pub fn for_classification(
        title: &str,
        classification: &Classification,
        status: OperatingStatus,
    ) -> Self {
        let mut distance = String::new();
        match classification {
            Classification::Invalid => {
                let _ = distance.push_str("SENSOR ERROR");
            }
            Classification::OutOfRange { .. } => {
                let _ = distance.push_str("OUT OF RANGE");
            }
            Classification::InRange { cm, .. } => {
                let text = DistanceText::from_cm(Some(*cm));
                let _ = write!(distance, "DISTANCE: {} {}", text.value, text.unit.symbol());
            }
        }

        let mut status_line = String::new();
        let _ = write!(status_line, "AUT-ACCESS: {}", status.label());

        Self {
            title: truncated(title),
            distance,
            status: status_line,
        }
    }

    /// Frame shown when the sensor never came up
    pub fn boot_failed(title: &str) -> Self {
        let mut distance = String::new();
        let _ = distance.push_str("SENSOR BOOT FAILED");
        let mut status = String::new();
        let _ = status.push_str("HALTED");
        Self {
            title: truncated(title),
            distance,
            status,
        }
    }

    /// Lines in top-to-bottom order
    pub fn lines(&self) -> [&str; 3] {
        [
            self.title.as_str(),
            self.distance.as_str(),
            self.status.as_str(),
        ]
    }
}

/// Copy at most [`LINE_LEN`] characters
fn truncated(text: &str) -> String<LINE_LEN> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// One accepted reading in the distance log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogRecord {
    /// Milliseconds since boot
    pub elapsed_ms: u64,
    /// Distance in centimeters (`None` renders as an error marker)
    pub distance_cm: Option<u16>,
    pub status: OperatingStatus,
}

impl LogRecord {
    /// Render the record into a fixed-capacity line
    pub fn to_line(&self) -> String<MAX_RECORD_LEN> {
        let mut line = String::new();
        let _ = write!(line, "{}", self);
        line
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = DistanceText::from_cm(self.distance_cm);
        write!(
            f,
            "{},{},{},{}",
            format_elapsed(self.elapsed_ms),
            text.value,
            text.unit.log_symbol(),
            self.status.label()
        )
    }
}
