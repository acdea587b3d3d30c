//! Rangeguard Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits the distance monitor
//! is written against. Chip-specific crates implement them, host tests mock
//! them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  rangeguard-core / rangeguard-drivers   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  rangeguard-hal (this crate - traits)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌───────────────────┐
//!           │ rangeguard-hal-   │
//!           │     rp2040        │
//!           └───────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital outputs (indicator lights)
//! - [`i2c::I2cBus`] - Two-wire bus transactions
//! - [`time::Monotonic`] - Millisecond clock for poll deadlines
//! - [`storage::RecordLog`] - Append-only persistent log, with the
//!   flash-queue implementation [`storage::QueueLog`]

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod storage;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::{I2cBus, I2cConfig};
pub use storage::{QueueLog, RecordLog, StorageError, MAX_RECORD_SIZE};
pub use time::{Deadline, Monotonic};
