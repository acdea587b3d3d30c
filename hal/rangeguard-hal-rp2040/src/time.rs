//! Monotonic clock

use embassy_time::Instant;
use rangeguard_hal::Monotonic;

/// Millisecond clock backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Monotonic for EmbassyClock {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}
