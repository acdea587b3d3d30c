//! Channel-backed distance log
//!
//! The monitor loop is synchronous; flash writes are not. [`ChannelLog`]
//! hands records to the log writer task without waiting and reports
//! [`LogError::Busy`] when the writer has fallen behind.

use rangeguard_core::format::LogRecord;
use rangeguard_core::traits::{LogError, LogSink};

use crate::channels::{LogCommand, LOG_CHANNEL};

/// Log sink feeding [`LOG_CHANNEL`]
pub struct ChannelLog;

impl LogSink for ChannelLog {
    fn start_session(&mut self) -> Result<(), LogError> {
        LOG_CHANNEL
            .try_send(LogCommand::StartSession)
            .map_err(|_| LogError::Busy)
    }

    fn append(&mut self, record: &LogRecord) -> Result<(), LogError> {
        LOG_CHANNEL
            .try_send(LogCommand::Append(record.to_line()))
            .map_err(|_| LogError::Busy)
    }
}
