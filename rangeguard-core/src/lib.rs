//! Board-agnostic core logic for the distance monitor firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Reading classification (INVALID / OUT_OF_RANGE / IN_RANGE)
//! - Alert tone timing
//! - Display frame and log record formatting
//! - Collaborator traits (display, indicator lights, alert tone, log)
//! - The read-classify-actuate control loop
//! - Configuration types and the embedded TOML parser

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alert;
pub mod config;
pub mod format;
pub mod monitor;
pub mod reading;
pub mod traits;

pub use alert::{AlertPattern, AlertTimer};
pub use monitor::{ApplyReport, Decision, Monitor, Outputs};
pub use reading::{classify, mm_to_cm, Classification, OperatingStatus, Reading, Thresholds};
