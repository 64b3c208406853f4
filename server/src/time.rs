//! Time source abstraction.
//!
//! Token issuance, expiry checks and the dashboard's "today" / "this month"
//! windows all read the clock through [`TimeSource`], so tests can pin and
//! advance time instead of sleeping.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Abstraction over the wall clock.
///
/// Implementations must be shareable across request tasks.
pub trait TimeSource: Send + Sync {
    /// Get the current time in milliseconds since Unix epoch.
    fn now_ms(&self) -> u64;

    /// Get the current time in whole seconds since Unix epoch.
    fn now_secs(&self) -> u64 {
        self.now_ms() / 1000
    }
}

/// Real time source using the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    #[allow(clippy::cast_possible_truncation)] // Milliseconds won't overflow u64 for billions of years
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as the epoch rather than panicking.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |duration| duration.as_millis() as u64)
    }
}

/// A clock that only moves when told to.
///
/// Backed by an atomic so it can sit behind the `Arc<dyn TimeSource>` held in
/// application state and be advanced from a test while requests run.
///
/// # Example
///
/// ```
/// use agendify::time::{ManualTimeSource, TimeSource};
///
/// let time = ManualTimeSource::new(1_000);
/// assert_eq!(time.now_ms(), 1_000);
///
/// time.advance_secs(2);
/// assert_eq!(time.now_ms(), 3_000);
/// ```
#[derive(Debug)]
pub struct ManualTimeSource {
    /// Current time in milliseconds since Unix epoch.
    current_time_ms: AtomicU64,
}

impl ManualTimeSource {
    /// Create a manual time source starting at `initial_time_ms`.
    #[must_use]
    pub const fn new(initial_time_ms: u64) -> Self {
        Self {
            current_time_ms: AtomicU64::new(initial_time_ms),
        }
    }

    /// Create a manual time source starting at `1_700_000_000_000`
    /// (2023-11-14T22:13:20Z).
    #[must_use]
    pub const fn default_start() -> Self {
        Self::new(1_700_000_000_000)
    }

    /// Advance time by the given number of milliseconds, saturating at `u64::MAX`.
    pub fn advance_ms(&self, ms: u64) {
        // fetch_update only fails if the closure returns None.
        let _ = self
            .current_time_ms
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
                Some(current.saturating_add(ms))
            });
    }

    /// Advance time by the given number of seconds.
    pub fn advance_secs(&self, secs: u64) {
        self.advance_ms(secs.saturating_mul(1000));
    }

    /// Set the current time. May move time backwards.
    pub fn set_ms(&self, time_ms: u64) {
        self.current_time_ms.store(time_ms, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.current_time_ms.load(Ordering::SeqCst)
    }
}

impl Default for ManualTimeSource {
    fn default() -> Self {
        Self::default_start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_time_source() {
        let source = SystemTimeSource;
        let t1 = source.now_ms();
        let t2 = source.now_ms();

        // Time should be reasonable (after 2020)
        assert!(t1 > 1_577_836_800_000);
        assert!(t2 >= t1);
    }

    #[test]
    fn test_manual_time_advance() {
        let time = ManualTimeSource::new(1000);

        time.advance_ms(100);
        assert_eq!(time.now_ms(), 1100);

        time.advance_secs(1);
        assert_eq!(time.now_ms(), 2100);
        assert_eq!(time.now_secs(), 2);
    }

    #[test]
    fn test_manual_time_set_and_saturate() {
        let time = ManualTimeSource::new(1000);

        time.set_ms(5000);
        assert_eq!(time.now_ms(), 5000);

        time.set_ms(u64::MAX - 1);
        time.advance_ms(10);
        assert_eq!(time.now_ms(), u64::MAX);
    }

    #[test]
    fn test_manual_time_default() {
        let time = ManualTimeSource::default();
        assert_eq!(time.now_secs(), 1_700_000_000);
    }
}
