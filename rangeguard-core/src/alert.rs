//! Alert tone timing
//!
//! While a reading stays below the alert threshold the tone pulses on a
//! fixed two-phase cycle: on for the first `on_ms` of every `period_ms`
//! window, off for the rest. Windows are counted from the first
//! alert-triggering timestamp. Leaving the alert range resets the timer so
//! the next entry starts a fresh window at offset 0.

/// Default tone-on time per window
pub const DEFAULT_ALERT_ON_MS: u32 = 100;

/// Default window length
pub const DEFAULT_ALERT_PERIOD_MS: u32 = 1100;

/// On/off pulse pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertPattern {
    /// Tone-on time at the start of each window (ms)
    pub on_ms: u32,
    /// Window length (ms)
    pub period_ms: u32,
}

impl Default for AlertPattern {
    fn default() -> Self {
        Self {
            on_ms: DEFAULT_ALERT_ON_MS,
            period_ms: DEFAULT_ALERT_PERIOD_MS,
        }
    }
}

/// Tracks the start of the current alert window
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertTimer {
    pattern: AlertPattern,
    /// Timestamp of the last phase transition (start of the current window)
    last_transition_ms: u64,
    /// True while the reading is inside the alert range
    armed: bool,
}

impl Default for AlertTimer {
    fn default() -> Self {
        Self::new(AlertPattern::default())
    }
}

impl AlertTimer {
    /// Create a disarmed timer
    pub const fn new(pattern: AlertPattern) -> Self {
        Self {
            pattern,
            last_transition_ms: 0,
            armed: false,
        }
    }

    /// Advance the timer for a sub-threshold reading
    ///
    /// Returns whether the tone should be on at `now_ms`.
    pub fn update(&mut self, now_ms: u64) -> bool {
        let period = self.pattern.period_ms as u64;
        if period == 0 {
            return false;
        }

        if !self.armed {
            self.armed = true;
            self.last_transition_ms = now_ms;
        }

        let elapsed = now_ms.saturating_sub(self.last_transition_ms);
        if elapsed >= period {
            // Skip whole windows, including ones missed between polls
            self.last_transition_ms += elapsed - elapsed % period;
        }

        now_ms.saturating_sub(self.last_transition_ms) < self.pattern.on_ms as u64
    }

    /// Disarm the timer (reading left the alert range)
    pub fn reset(&mut self, now_ms: u64) {
        self.armed = false;
        self.last_transition_ms = now_ms;
    }

    /// Check if the timer is inside an alert episode
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Timestamp of the last phase transition or reset
    pub fn last_transition_ms(&self) -> u64 {
        self.last_transition_ms
    }

    /// The configured pulse pattern
    pub fn pattern(&self) -> AlertPattern {
        self.pattern
    }
}
