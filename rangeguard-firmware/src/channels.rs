//! Inter-task communication channels
//!
//! Defines the static channels used for communication between Embassy tasks.
//! Uses embassy-sync primitives for safe async communication.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use heapless::String;

use rangeguard_core::format::MAX_RECORD_LEN;

/// Channel capacity for log commands
///
/// Flash writes are slow next to the 200 ms poll, and erasing the
/// partition at session start takes far longer. Records arriving while
/// the channel is full are dropped.
const LOG_CHANNEL_SIZE: usize = 16;

/// Commands for the log writer task
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogCommand {
    /// Erase the log and write the header
    StartSession,
    /// Append one rendered record
    Append(String<MAX_RECORD_LEN>),
}

/// Log commands from the monitor task to the log writer
pub static LOG_CHANNEL: Channel<CriticalSectionRawMutex, LogCommand, LOG_CHANNEL_SIZE> =
    Channel::new();
