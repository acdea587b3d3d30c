//! Distance readings and their classification
//!
//! The sensor reports millimeters. Anything at or above
//! [`INVALID_DISTANCE_MM`] (one unit past the 2 m rated maximum) has no
//! usable distance; [`mm_to_cm`] is the only place that decides this.
//! Everything downstream works on `Option<u16>` centimeters where `None`
//! is the INVALID reading.

/// Raw sensor value that marks "no valid reading"
pub const INVALID_DISTANCE_MM: u16 = 2001;

/// Default proximity threshold: below this the monitored access is OPEN
pub const DEFAULT_PROXIMITY_THRESHOLD_CM: u16 = 10;

/// Default display ceiling: above this a valid reading is OUT_OF_RANGE
pub const DEFAULT_MAX_RANGE_CM: u16 = 999;

/// Convert a raw millimeter value to whole centimeters
///
/// Returns `None` for values at or above [`INVALID_DISTANCE_MM`].
pub fn mm_to_cm(raw_mm: u16) -> Option<u16> {
    if raw_mm >= INVALID_DISTANCE_MM {
        None
    } else {
        Some(raw_mm / 10)
    }
}

/// Operating status derived from an in-range reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingStatus {
    /// Object closer than the proximity threshold
    Open,
    /// Object at or beyond the proximity threshold
    #[default]
    Close,
}

impl OperatingStatus {
    /// Derive the status from a centimeter value
    ///
    /// The boundary is exact: `cm == threshold` is `Close`.
    pub fn from_cm(cm: u16, proximity_threshold_cm: u16) -> Self {
        if cm < proximity_threshold_cm {
            OperatingStatus::Open
        } else {
            OperatingStatus::Close
        }
    }

    /// Label used on the display and in the log
    pub fn label(self) -> &'static str {
        match self {
            OperatingStatus::Open => "OPEN",
            OperatingStatus::Close => "CLOSE",
        }
    }
}

/// A single distance observation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    /// Distance in whole centimeters, `None` if the sensor gave no valid value
    pub distance_cm: Option<u16>,
    /// Milliseconds since boot when the reading was taken
    pub timestamp_ms: u64,
}

impl Reading {
    /// A reading with no valid distance (timeout, bus error, sensor sentinel)
    pub const fn invalid(timestamp_ms: u64) -> Self {
        Self {
            distance_cm: None,
            timestamp_ms,
        }
    }

    /// A reading from an already converted centimeter value
    pub const fn from_cm(distance_cm: Option<u16>, timestamp_ms: u64) -> Self {
        Self {
            distance_cm,
            timestamp_ms,
        }
    }

    /// A reading from a raw millimeter value
    pub fn from_mm(raw_mm: u16, timestamp_ms: u64) -> Self {
        Self::from_cm(mm_to_cm(raw_mm), timestamp_ms)
    }

    /// Check if the reading carries a distance
    pub fn is_valid(&self) -> bool {
        self.distance_cm.is_some()
    }

    /// Check if a valid reading lies beyond the declared measurement range
    pub fn exceeds(&self, max_range_cm: u16) -> bool {
        matches!(self.distance_cm, Some(cm) if cm > max_range_cm)
    }
}

/// Classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Thresholds {
    /// Below this the status is OPEN
    pub proximity_cm: u16,
    /// Above this the reading is OUT_OF_RANGE
    pub max_range_cm: u16,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            proximity_cm: DEFAULT_PROXIMITY_THRESHOLD_CM,
            max_range_cm: DEFAULT_MAX_RANGE_CM,
        }
    }
}

/// Outcome of classifying a reading
///
/// Display, log and actuation all branch on this one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Classification {
    /// No usable distance
    Invalid,
    /// Valid distance beyond the declared range
    OutOfRange { cm: u16 },
    /// Valid distance inside the declared range
    InRange { cm: u16, status: OperatingStatus },
}

impl Classification {
    /// Check if this is an IN_RANGE reading
    pub fn is_in_range(&self) -> bool {
        matches!(self, Classification::InRange { .. })
    }
}

/// Classify a centimeter reading against the thresholds
pub fn classify(distance_cm: Option<u16>, thresholds: &Thresholds) -> Classification {
    match distance_cm {
        None => Classification::Invalid,
        Some(cm) if cm > thresholds.max_range_cm => Classification::OutOfRange { cm },
        Some(cm) => Classification::InRange {
            cm,
            status: OperatingStatus::from_cm(cm, thresholds.proximity_cm),
        },
    }
}
