//! Time source abstraction
//!
//! The sanitizer's date fallback and the confirmation window both read the
//! current time through [`Clock`] so tests can pin it.

use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// Source of the current time
pub trait Clock: Send + Sync {
    /// Current instant in UTC
    fn now(&self) -> DateTime<Utc>;

    /// Current instant as epoch seconds
    fn timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock; clones share the same reading
#[derive(Debug, Clone)]
pub struct FixedClock {
    seconds: Arc<AtomicI64>,
}

impl FixedClock {
    /// Create a clock frozen at the given epoch seconds
    pub fn at_timestamp(seconds: i64) -> Self {
        Self {
            seconds: Arc::new(AtomicI64::new(seconds)),
        }
    }

    /// Move the clock forward (or backward, for negative values)
    pub fn advance(&self, seconds: i64) {
        self.seconds.fetch_add(seconds, Ordering::SeqCst);
    }

    pub fn set(&self, seconds: i64) {
        self.seconds.store(seconds, Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.seconds.load(Ordering::SeqCst), 0)
            .single()
            .unwrap_or_default()
    }

    fn timestamp(&self) -> i64 {
        self.seconds.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_shares_state() {
        let clock = FixedClock::at_timestamp(1_000);
        let handle = clock.clone();
        handle.advance(5);
        assert_eq!(clock.timestamp(), 1_005);
        assert_eq!(clock.now().timestamp(), 1_005);

        clock.set(0);
        assert_eq!(handle.now().to_rfc3339(), "1970-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_system_clock_is_recent() {
        assert!(SystemClock.timestamp() > 1_600_000_000);
    }
}
