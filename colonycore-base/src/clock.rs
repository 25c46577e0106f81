use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};

/// Wall-clock UTC, injectable so the Service and Store can be driven deterministically in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that always returns the same instant unless explicitly advanced. Useful for
/// asserting exact CreatedAt/UpdatedAt values in tests without racing the wall clock.
#[derive(Debug)]
pub struct FixedClock {
    micros: AtomicI64,
}

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        FixedClock { micros: AtomicI64::new(instant.timestamp_micros()) }
    }

    pub fn advance(&self, duration: chrono::Duration) {
        self.micros.fetch_add(duration.num_microseconds().unwrap_or(0), Ordering::SeqCst);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst))
            .expect("fixed clock holds a valid timestamp by construction")
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn fixed_clock_advances_deterministically() {
        let clock = FixedClock::at(DateTime::UNIX_EPOCH);
        let first = clock.now();
        clock.advance(chrono::Duration::seconds(5));
        let second = clock.now();
        assert_eq!((second - first).num_seconds(), 5);
    }
}
