use chrono::{DateTime, Utc};

/// Source of wall-clock time for everything that stamps or expires data.
/// Production code uses `SystemClock`; tests drive a `ManualClock`.
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

#[cfg(test)]
pub use manual::ManualClock;


#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::default();
        let first = clock.now();
        assert_eq!(clock.now(), first);
        clock.advance(Duration::minutes(5));
        assert_eq!(clock.now() - first, Duration::minutes(5));
    }
}
