//! Distance log trait

use crate::format::LogRecord;

/// Errors from the log collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LogError {
    /// The log cannot take the record right now; it is dropped
    Busy,
    /// The storage medium reported a failure
    Storage,
}

/// Append-only log of accepted readings
///
/// The control loop does not retry or buffer: a failed append is reported
/// and the record is lost.
pub trait LogSink {
    /// Begin a new session (truncate and write the header)
    fn start_session(&mut self) -> Result<(), LogError>;

    /// Append one record
    fn append(&mut self, record: &LogRecord) -> Result<(), LogError>;
}
