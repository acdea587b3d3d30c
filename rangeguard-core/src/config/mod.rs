//! Configuration types and parsing
//!
//! Configuration is a small TOML file embedded in the firmware image.

pub mod parse;
pub mod types;

pub use parse::{parse_config, ParseError};
pub use types::*;
