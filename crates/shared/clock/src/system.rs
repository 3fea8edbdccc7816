use chrono::{SubsecRound, Utc};
use tally_core::Timestamp;
use tally_ports::Clock;

/// Wall-clock UTC time at millisecond precision
///
/// Sub-millisecond digits are dropped so a timestamp written by a store and
/// read back compares equal to the one the snapshot was stamped with.
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Utc::now().trunc_subsecs(3)
    }

    fn name(&self) -> &str {
        "SystemClock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Timelike};

    #[test]
    fn test_millisecond_precision() {
        let now = SystemClock::new().now();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn test_window_start() {
        let clock = SystemClock::new();
        let since = clock.since(Duration::hours(1));
        let now = clock.now();

        assert!(now - since >= Duration::hours(1));
        assert!(now - since < Duration::hours(1) + Duration::seconds(5));
    }
}
