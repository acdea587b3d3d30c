//! Simple TOML parser for the appliance configuration
//!
//! This is a minimal TOML parser that handles only the subset needed for
//! `monitor.toml`. It does NOT support the full TOML spec.
//!
//! Supported features:
//! - Key = value pairs (string, integer, boolean)
//! - [section] headers
//! - Comments (# ...), including trailing comments
//!
//! NOT supported:
//! - Arrays and inline tables
//! - Multi-line strings
//! - Dotted keys

use heapless::String;

use super::types::AppConfig;
use crate::format::LINE_LEN;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Key not recognized in its section
    UnknownKey,
    /// Value has the wrong type or does not fit
    InvalidValue,
    /// Line is neither a header nor `key = value`
    InvalidLine,
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Sensor,
    Monitor,
    Alert,
    Display,
    Log,
}

/// Parse TOML configuration into AppConfig
///
/// Missing sections and keys keep their defaults. The result is not
/// validated; call [`AppConfig::validate`] afterwards.
pub fn parse_config(input: &str) -> Result<AppConfig, ParseError> {
    let mut config = AppConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') {
            let header = strip_comment(line);
            if !header.ends_with(']') {
                return Err(ParseError::InvalidSection);
            }
            section = parse_section_header(&header[1..header.len() - 1])?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine)?;
        apply_value(section, key, value, &mut config)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "sensor" => Ok(Section::Sensor),
        "monitor" => Ok(Section::Monitor),
        "alert" => Ok(Section::Alert),
        "display" => Ok(Section::Display),
        "log" => Ok(Section::Log),
        _ => Err(ParseError::InvalidSection),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut AppConfig,
) -> Result<(), ParseError> {
    match (section, key) {
        (Section::Sensor, "timeout_ms") => config.sensor.timeout_ms = parse_int(value)?,
        (Section::Sensor, "timing_budget_us") => {
            config.sensor.timing_budget_us = parse_int(value)?
        }
        (Section::Sensor, "continuous_period_ms") => {
            config.sensor.continuous_period_ms = parse_int(value)?
        }

        (Section::Monitor, "poll_interval_ms") => {
            config.monitor.poll_interval_ms = parse_int(value)?
        }
        (Section::Monitor, "proximity_threshold_cm") => {
            config.monitor.proximity_threshold_cm = parse_int(value)?
        }
        (Section::Monitor, "max_range_cm") => config.monitor.max_range_cm = parse_int(value)?,

        (Section::Alert, "enabled") => config.alert.enabled = parse_bool(value)?,
        (Section::Alert, "threshold_cm") => config.alert.threshold_cm = parse_int(value)?,
        (Section::Alert, "on_ms") => config.alert.on_ms = parse_int(value)?,
        (Section::Alert, "period_ms") => config.alert.period_ms = parse_int(value)?,
        (Section::Alert, "frequency_hz") => config.alert.frequency_hz = parse_int(value)?,

        (Section::Display, "title") => config.display.title = parse_title(value)?,

        (Section::Log, "enabled") => config.log.enabled = parse_bool(value)?,

        _ => return Err(ParseError::UnknownKey),
    }
    Ok(())
}

/// Remove a trailing comment that is not inside a string
fn strip_comment(text: &str) -> &str {
    if let Some(hash_pos) = text.find('#') {
        let quote_count = text[..hash_pos].matches('"').count();
        if quote_count % 2 == 0 {
            return text[..hash_pos].trim();
        }
    }
    text
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = strip_comment(line[eq_pos + 1..].trim());

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Parse the panel title
///
/// ASCII only: the panel font has no other glyphs, and the line limit is
/// counted in bytes.
fn parse_title(value: &str) -> Result<String<LINE_LEN>, ParseError> {
    let title = parse_string(value)?;
    if !title.is_ascii() {
        return Err(ParseError::InvalidValue);
    }
    String::try_from(title).map_err(|_| ParseError::InvalidValue)
}

/// Parse a string value (removes quotes)
fn parse_string(value: &str) -> Result<&str, ParseError> {
    if value.starts_with('"') && value.ends_with('"') && value.len() >= 2 {
        Ok(&value[1..value.len() - 1])
    } else {
        Err(ParseError::InvalidValue)
    }
}

/// Parse an integer value (underscore separators allowed)
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: String<24> = String::new();
    for ch in value.chars().filter(|&c| c != '_') {
        digits.push(ch).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(ParseError::InvalidValue),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# Distance monitor configuration

[sensor]
timeout_ms = 5000            # generous for a slow bus
timing_budget_us = 33_000
continuous_period_ms = 50

[monitor]
poll_interval_ms = 250
proximity_threshold_cm = 12
max_range_cm = 180

[alert]
enabled = false
threshold_cm = 8
on_ms = 150
period_ms = 1000
frequency_hz = 2500

[display]
title = "GATE #3"

[log]
enabled = false
"#;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(SAMPLE).unwrap();
        assert_eq!(config.sensor.timeout_ms, 5000);
        assert_eq!(config.sensor.timing_budget_us, 33_000);
        assert_eq!(config.sensor.continuous_period_ms, 50);
        assert_eq!(config.monitor.poll_interval_ms, 250);
        assert_eq!(config.monitor.proximity_threshold_cm, 12);
        assert_eq!(config.monitor.max_range_cm, 180);
        assert!(!config.alert.enabled);
        assert_eq!(config.alert.threshold_cm, 8);
        assert_eq!(config.alert.on_ms, 150);
        assert_eq!(config.alert.period_ms, 1000);
        assert_eq!(config.alert.frequency_hz, 2500);
        assert_eq!(config.display.title.as_str(), "GATE #3");
        assert!(!config.log.enabled);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_missing_keys_keep_defaults() {
        let config = parse_config("[monitor]\nmax_range_cm = 150\n").unwrap();
        assert_eq!(config.monitor.max_range_cm, 150);
        assert_eq!(config.monitor.proximity_threshold_cm, 10);
        assert_eq!(config.sensor, AppConfig::default().sensor);
    }

    #[test]
    fn test_empty_input_is_default() {
        assert_eq!(parse_config("").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            parse_config("[wifi]\n").unwrap_err(),
            ParseError::InvalidSection
        );
        assert_eq!(
            parse_config("[sensor]\nspeed = 3\n").unwrap_err(),
            ParseError::UnknownKey
        );
        assert_eq!(
            parse_config("[sensor]\ntimeout_ms = soon\n").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[monitor]\nmax_range_cm = 70000\n").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("[alert]\nenabled = yes\n").unwrap_err(),
            ParseError::InvalidValue
        );
        assert_eq!(
            parse_config("timeout_ms 1000\n").unwrap_err(),
            ParseError::InvalidLine
        );
        assert_eq!(
            parse_config("timeout_ms = 1000\n").unwrap_err(),
            ParseError::UnknownKey
        );
    }

    #[test]
    fn test_title_too_long() {
        let input = "[display]\ntitle = \"THIS TITLE IS FAR TOO LONG\"\n";
        assert_eq!(parse_config(input).unwrap_err(), ParseError::InvalidValue);
    }

    #[test]
    fn test_title_limits() {
        // Exactly one panel line
        let config = parse_config("[display]\ntitle = \"ABCDEFGHIJKLMNOPQRSTU\"\n").unwrap();
        assert_eq!(config.display.title.len(), LINE_LEN);

        // 21 characters but 22 bytes, and not drawable
        let input = "[display]\ntitle = \"MONITOR DE DIST\u{00C2}NCIAS\"\n";
        assert_eq!(parse_config(input).unwrap_err(), ParseError::InvalidValue);

        // Short non-ASCII titles are rejected too
        let input = "[display]\ntitle = \"PORT\u{00C3}O\"\n";
        assert_eq!(parse_config(input).unwrap_err(), ParseError::InvalidValue);
    }
}
