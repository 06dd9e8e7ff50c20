//! Server-side clock used to stamp document writes
//!
//! All `lastModified`/`createdAt` values come from a [`Clock`] handed to the
//! store at construction. Client clocks are never used for stamping.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};

/// Source of server time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock that never runs backwards
///
/// If the system time steps back, the last value handed out is repeated
/// until the wall clock catches up.
#[derive(Debug, Default)]
pub struct SystemClock {
    last_millis: AtomicI64,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        let wall = Utc::now().timestamp_millis();
        let previous = self.last_millis.fetch_max(wall, Ordering::AcqRel);
        from_millis(previous.max(wall))
    }
}

/// Manually driven clock for tests and replay tooling
#[derive(Debug)]
pub struct ManualClock {
    millis: AtomicI64,
}

impl ManualClock {
    pub fn at_millis(millis: i64) -> Self {
        Self {
            millis: AtomicI64::new(millis),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.store(millis, Ordering::Release);
    }

    pub fn advance_millis(&self, delta: i64) {
        self.millis.fetch_add(delta, Ordering::AcqRel);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        from_millis(self.millis.load(Ordering::Acquire))
    }
}

/// Convert epoch milliseconds to a UTC timestamp, clamping out-of-range values.
pub fn from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or(if millis < 0 {
        DateTime::<Utc>::MIN_UTC
    } else {
        DateTime::<Utc>::MAX_UTC
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_never_goes_backwards() {
        let clock = SystemClock::new();
        // Pretend a later time was already handed out.
        let future = Utc::now().timestamp_millis() + 60_000;
        clock.last_millis.store(future, Ordering::Release);

        assert_eq!(clock.now().timestamp_millis(), future);
        assert!(clock.now().timestamp_millis() >= future);
    }

    #[test]
    fn test_system_clock_tracks_wall_time() {
        let clock = SystemClock::new();
        let before = Utc::now().timestamp_millis();
        let now = clock.now().timestamp_millis();
        assert!(now >= before);
    }

    #[test]
    fn test_manual_clock() {
        let clock = ManualClock::at_millis(1_000);
        assert_eq!(clock.now().timestamp_millis(), 1_000);

        clock.advance_millis(500);
        assert_eq!(clock.now().timestamp_millis(), 1_500);

        clock.set_millis(10);
        assert_eq!(clock.now().timestamp_millis(), 10);
    }
}
