//! Flash-backed distance log for RP2040
//!
//! The log is a [`QueueLog`] over the last 64KB of the on-board flash.
//! Records are stored as raw text lines; when the partition fills up the
//! oldest records are overwritten.

use embassy_rp::dma::Channel;
use embassy_rp::flash::{Async, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use rangeguard_hal::QueueLog;

/// Flash storage configuration
pub const FLASH_SIZE: usize = 2 * 1024 * 1024; // 2MB flash on the Pico
pub const LOG_PARTITION_SIZE: usize = 64 * 1024; // 64KB for the log
pub const LOG_PARTITION_START: usize = FLASH_SIZE - LOG_PARTITION_SIZE;

/// Flash range for the log partition
pub const LOG_RANGE: core::ops::Range<u32> = (LOG_PARTITION_START as u32)..(FLASH_SIZE as u32);

const _: () = assert!(LOG_PARTITION_START % ERASE_SIZE == 0);
const _: () = assert!(LOG_PARTITION_SIZE >= 2 * ERASE_SIZE);

/// RP2040 flash log
pub type FlashLog<'d> = QueueLog<Flash<'d, FLASH, Async, FLASH_SIZE>>;

/// Open the log partition
pub fn flash_log<'d>(flash: Peri<'d, FLASH>, dma: Peri<'d, impl Channel>) -> FlashLog<'d> {
    QueueLog::new(Flash::new(flash, dma), LOG_RANGE)
}
