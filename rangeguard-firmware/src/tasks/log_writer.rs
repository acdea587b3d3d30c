//! Log writer task
//!
//! Drains [`LOG_CHANNEL`] into the flash log partition. Storage failures
//! are reported here; the monitor loop never waits on flash.
//!
//! The previous session is still in flash at power-up. It is printed over
//! defmt before the new session erases it.

use defmt::*;

use rangeguard_core::format::LOG_HEADER;
use rangeguard_hal::RecordLog;
use rangeguard_hal_rp2040::FlashLog;

use crate::channels::{LogCommand, LOG_CHANNEL};

/// Log writer task
#[embassy_executor::task]
pub async fn log_writer_task(mut log: FlashLog<'static>) {
    info!("Log writer started");

    let mut records: u32 = 0;

    loop {
        match LOG_CHANNEL.receive().await {
            LogCommand::StartSession => {
                dump_previous_session(&mut log).await;

                info!("Starting log session");
                if let Err(e) = log.clear().await {
                    error!("Failed to erase log: {:?}", e);
                    continue;
                }
                if let Err(e) = log.append(LOG_HEADER.as_bytes()).await {
                    error!("Failed to write log header: {:?}", e);
                }
                records = 0;
            }
            LogCommand::Append(line) => match log.append(line.as_bytes()).await {
                Ok(()) => {
                    records = records.wrapping_add(1);
                    trace!("Logged record {}: {}", records, line.as_str());
                }
                Err(e) => warn!("Log append failed: {:?}", e),
            },
        }
    }
}

/// Print every stored line of the last session
async fn dump_previous_session<L: RecordLog>(log: &mut L) {
    info!("Previous session log:");
    let result = log
        .for_each(|line| match core::str::from_utf8(line) {
            Ok(text) => info!("  {}", text),
            Err(_) => warn!("  <{} unreadable bytes>", line.len()),
        })
        .await;

    match result {
        Ok(count) => info!("End of previous session log ({} lines)", count),
        Err(e) => warn!("Could not read previous session log: {:?}", e),
    }
}
