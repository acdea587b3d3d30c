//! Configuration type definitions
//!
//! Defaults reproduce the behavior of the deployed appliance.

use heapless::String;

use crate::alert::{AlertPattern, DEFAULT_ALERT_ON_MS, DEFAULT_ALERT_PERIOD_MS};
use crate::format::{DEFAULT_TITLE, LINE_LEN};
use crate::reading::{Thresholds, DEFAULT_MAX_RANGE_CM, DEFAULT_PROXIMITY_THRESHOLD_CM};

/// Default poll deadline for the sensor (ms)
pub const DEFAULT_SENSOR_TIMEOUT_MS: u32 = 1000;

/// Default measurement timing budget (µs)
pub const DEFAULT_TIMING_BUDGET_US: u32 = 33_000;

/// Default sleep between control loop iterations (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 200;

/// Default alert tone frequency (Hz)
pub const DEFAULT_TONE_FREQUENCY_HZ: u32 = 4000;

/// Range sensor configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SensorConfig {
    /// Deadline for boot and read polls (ms)
    pub timeout_ms: u32,
    /// Measurement timing budget (µs)
    pub timing_budget_us: u32,
    /// Inter-measurement period, 0 for back-to-back ranging (ms)
    pub continuous_period_ms: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_SENSOR_TIMEOUT_MS,
            timing_budget_us: DEFAULT_TIMING_BUDGET_US,
            continuous_period_ms: 0,
        }
    }
}

/// Control loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MonitorConfig {
    /// Sleep between iterations (ms)
    pub poll_interval_ms: u32,
    /// Below this the status is OPEN (cm)
    pub proximity_threshold_cm: u16,
    /// Above this a valid reading is OUT_OF_RANGE (cm)
    pub max_range_cm: u16,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            proximity_threshold_cm: DEFAULT_PROXIMITY_THRESHOLD_CM,
            max_range_cm: DEFAULT_MAX_RANGE_CM,
        }
    }
}

/// Alert tone configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AlertConfig {
    /// Enable the audible alert
    pub enabled: bool,
    /// Below this the tone pattern runs (cm)
    pub threshold_cm: u16,
    /// Tone-on time per window (ms)
    pub on_ms: u32,
    /// Window length (ms)
    pub period_ms: u32,
    /// Tone frequency (Hz)
    pub frequency_hz: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            threshold_cm: DEFAULT_PROXIMITY_THRESHOLD_CM,
            on_ms: DEFAULT_ALERT_ON_MS,
            period_ms: DEFAULT_ALERT_PERIOD_MS,
            frequency_hz: DEFAULT_TONE_FREQUENCY_HZ,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// First line of the panel
    pub title: String<LINE_LEN>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let mut title = String::new();
        let _ = title.push_str(DEFAULT_TITLE);
        Self { title }
    }
}

/// Distance log configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LogConfig {
    /// Record accepted readings
    pub enabled: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Complete appliance configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AppConfig {
    pub sensor: SensorConfig,
    pub monitor: MonitorConfig,
    pub alert: AlertConfig,
    pub display: DisplayConfig,
    pub log: LogConfig,
}

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Sensor timeout must be non-zero
    ZeroTimeout,
    /// Poll interval must be non-zero
    ZeroPollInterval,
    /// Declared measurement range must be non-zero
    ZeroRange,
    /// Alert threshold must not exceed the proximity threshold
    AlertThresholdAboveProximity,
    /// Alert window must be non-zero
    ZeroAlertPeriod,
    /// Tone-on time must be shorter than the window
    AlertOnNotShorterThanPeriod,
    /// Tone frequency must be non-zero
    ZeroToneFrequency,
    /// Display title must not be empty
    EmptyTitle,
}

impl AppConfig {
    /// Check cross-field constraints
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sensor.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.monitor.poll_interval_ms == 0 {
            return Err(ConfigError::ZeroPollInterval);
        }
        if self.monitor.max_range_cm == 0 {
            return Err(ConfigError::ZeroRange);
        }
        if self.alert.threshold_cm > self.monitor.proximity_threshold_cm {
            return Err(ConfigError::AlertThresholdAboveProximity);
        }
        if self.alert.period_ms == 0 {
            return Err(ConfigError::ZeroAlertPeriod);
        }
        if self.alert.on_ms >= self.alert.period_ms {
            return Err(ConfigError::AlertOnNotShorterThanPeriod);
        }
        if self.alert.frequency_hz == 0 {
            return Err(ConfigError::ZeroToneFrequency);
        }
        if self.display.title.is_empty() {
            return Err(ConfigError::EmptyTitle);
        }
        Ok(())
    }

    /// Classification thresholds
    pub fn thresholds(&self) -> Thresholds {
        Thresholds {
            proximity_cm: self.monitor.proximity_threshold_cm,
            max_range_cm: self.monitor.max_range_cm,
        }
    }

    /// Alert pulse pattern
    pub fn alert_pattern(&self) -> AlertPattern {
        AlertPattern {
            on_ms: self.alert.on_ms,
            period_ms: self.alert.period_ms,
        }
    }
}
