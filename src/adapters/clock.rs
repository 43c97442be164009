//! Clock adapters.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{TimeZone, Utc};

use crate::domain::foundation::Timestamp;
use crate::ports::Clock;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
///
/// Used by tests and by operational replays of automation at a chosen instant.
#[derive(Debug)]
pub struct FixedClock {
    millis: AtomicI64,
}

impl FixedClock {
    pub fn at(instant: Timestamp) -> Self {
        Self {
            millis: AtomicI64::new(instant.as_datetime().timestamp_millis()),
        }
    }

    /// Moves the clock to `instant`.
    pub fn set(&self, instant: Timestamp) {
        self.millis
            .store(instant.as_datetime().timestamp_millis(), Ordering::SeqCst);
    }

    /// Moves the clock forward by whole days.
    pub fn advance_days(&self, days: i64) {
        self.set(self.now().plus_days(days));
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        let millis = self.millis.load(Ordering::SeqCst);
        // Only ever stores values taken from a valid DateTime<Utc>.
        match Utc.timestamp_millis_opt(millis).single() {
            Some(dt) => Timestamp::from_datetime(dt),
            None => Timestamp::now(),
        }
    }
}
