//! Build script for rangeguard-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates monitor.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Known keys per section, with their expected value kind
const SCHEMA: &[(&str, &[(&str, Kind)])] = &[
    (
        "sensor",
        &[
            ("timeout_ms", Kind::Int),
            ("timing_budget_us", Kind::Int),
            ("continuous_period_ms", Kind::Int),
        ],
    ),
    (
        "monitor",
        &[
            ("poll_interval_ms", Kind::Int),
            ("proximity_threshold_cm", Kind::Int),
            ("max_range_cm", Kind::Int),
        ],
    ),
    (
        "alert",
        &[
            ("enabled", Kind::Bool),
            ("threshold_cm", Kind::Int),
            ("on_ms", Kind::Int),
            ("period_ms", Kind::Int),
            ("frequency_hz", Kind::Int),
        ],
    ),
    ("display", &[("title", Kind::Str)]),
    ("log", &[("enabled", Kind::Bool)]),
];

/// Display line width in characters
const LINE_LEN: usize = 21;

#[derive(Clone, Copy, PartialEq)]
enum Kind {
    Int,
    Bool,
    Str,
}

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate monitor.toml configuration at compile time
fn validate_config() {
    println!("cargo:rerun-if-changed=monitor.toml");

    let config_path = Path::new("monitor.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read monitor.toml", &[e.to_string()]),
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in monitor.toml",
            &e.to_string().lines().map(str::to_string).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();
    validate_schema(&config, &mut errors);
    if errors.is_empty() {
        validate_values(&config, &mut errors);
    }

    if !errors.is_empty() {
        fail("Invalid configuration in monitor.toml", &errors);
    }

    println!("cargo:warning=monitor.toml validated successfully");
}

/// Abort the build with a boxed error message
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            let truncated = if line.len() > 62 {
                format!("{}...", &line[..59])
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reject unknown sections, unknown keys and wrongly typed values
fn validate_schema(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        errors.push("top level must be a table".to_string());
        return;
    };

    for (section, value) in root {
        let Some(keys) = SCHEMA.iter().find(|(name, _)| name == section).map(|(_, k)| *k) else {
            errors.push(format!("unknown section [{}]", section));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", section));
            continue;
        };

        for (key, value) in table {
            let Some(kind) = keys.iter().find(|(name, _)| name == key).map(|(_, k)| *k) else {
                errors.push(format!("[{}] unknown key '{}'", section, key));
                continue;
            };
            let ok = match kind {
                Kind::Int => value.as_integer().is_some_and(|v| v >= 0),
                Kind::Bool => value.is_bool(),
                Kind::Str => value.is_str(),
            };
            if !ok {
                let expected = match kind {
                    Kind::Int => "a non-negative integer",
                    Kind::Bool => "true or false",
                    Kind::Str => "a string",
                };
                errors.push(format!("[{}] {} must be {}", section, key, expected));
            }
        }
    }
}

fn int(config: &toml::Value, section: &str, key: &str, default: i64) -> i64 {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .and_then(|v| v.as_integer())
        .unwrap_or(default)
}

/// Cross-field rules, mirrored from `AppConfig::validate`
fn validate_values(config: &toml::Value, errors: &mut Vec<String>) {
    if int(config, "sensor", "timeout_ms", 1000) == 0 {
        errors.push("[sensor] timeout_ms must be non-zero".to_string());
    }
    if int(config, "sensor", "continuous_period_ms", 0) > u32::MAX as i64 {
        errors.push("[sensor] continuous_period_ms is too large".to_string());
    }
    if int(config, "monitor", "poll_interval_ms", 200) == 0 {
        errors.push("[monitor] poll_interval_ms must be non-zero".to_string());
    }

    let proximity = int(config, "monitor", "proximity_threshold_cm", 10);
    let max_range = int(config, "monitor", "max_range_cm", 999);
    let alert = int(config, "alert", "threshold_cm", 10);
    for (key, value) in [
        ("monitor.proximity_threshold_cm", proximity),
        ("monitor.max_range_cm", max_range),
        ("alert.threshold_cm", alert),
    ] {
        if value > u16::MAX as i64 {
            errors.push(format!("{} must fit in 16 bits", key));
        }
    }
    if max_range == 0 {
        errors.push("[monitor] max_range_cm must be non-zero".to_string());
    }
    if alert > proximity {
        errors.push(format!(
            "[alert] threshold_cm ({}) exceeds proximity_threshold_cm ({})",
            alert, proximity
        ));
    }

    let on_ms = int(config, "alert", "on_ms", 100);
    let period_ms = int(config, "alert", "period_ms", 1100);
    if period_ms == 0 {
        errors.push("[alert] period_ms must be non-zero".to_string());
    } else if on_ms >= period_ms {
        errors.push("[alert] on_ms must be shorter than period_ms".to_string());
    }
    if int(config, "alert", "frequency_hz", 4000) == 0 {
        errors.push("[alert] frequency_hz must be non-zero".to_string());
    }

    if let Some(title) = config
        .get("display")
        .and_then(|d| d.get("title"))
        .and_then(|t| t.as_str())
    {
        if title.is_empty() {
            errors.push("[display] title must not be empty".to_string());
        } else if !title.is_ascii() {
            errors.push("[display] title must be ASCII".to_string());
        } else if title.len() > LINE_LEN {
            errors.push(format!("[display] title exceeds {} characters", LINE_LEN));
        }
    }
}
