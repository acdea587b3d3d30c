//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod log_writer;
pub mod monitor;

pub use log_writer::log_writer_task;
pub use monitor::{monitor_task, MonitorOutputs, RangeSensor};
