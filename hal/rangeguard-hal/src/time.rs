//! Time abstractions
//!
//! Poll loops in the drivers compute a deadline once on entry and compare
//! it against a monotonic millisecond clock on every iteration.

/// Monotonic millisecond clock (time since boot)
pub trait Monotonic {
    /// Milliseconds elapsed since boot
    fn now_ms(&self) -> u64;

    /// Start a deadline `timeout_ms` from now
    fn deadline(&self, timeout_ms: u32) -> Deadline {
        Deadline::new(self.now_ms(), timeout_ms)
    }
}

impl<T: Monotonic + ?Sized> Monotonic for &T {
    fn now_ms(&self) -> u64 {
        T::now_ms(self)
    }
}

/// A point in time after which a poll gives up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline {
    start_ms: u64,
    timeout_ms: u32,
}

impl Deadline {
    /// Create a deadline starting at `start_ms`
    pub const fn new(start_ms: u64, timeout_ms: u32) -> Self {
        Self {
            start_ms,
            timeout_ms,
        }
    }

    /// Check whether the deadline has passed
    ///
    /// The deadline is exceeded once strictly more than `timeout_ms` has
    /// elapsed since the start.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.start_ms) > self.timeout_ms as u64
    }
}
