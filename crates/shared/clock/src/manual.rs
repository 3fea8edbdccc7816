use chrono::{Duration, Utc};
use std::sync::{PoisonError, RwLock};
use tally_core::Timestamp;
use tally_ports::Clock;

/// Clock whose time only changes through `advance` / `set_time`
///
/// Safe to share between the sync task and the test body.
pub struct ManualClock {
    current_time: RwLock<Timestamp>,
}

impl ManualClock {
    /// Frozen at `time`
    pub fn at(time: Timestamp) -> Self {
        Self {
            current_time: RwLock::new(time),
        }
    }

    /// Frozen at the current wall-clock time
    pub fn frozen_now() -> Self {
        Self::at(Utc::now())
    }

    /// Move time forward by `duration`
    pub fn advance(&self, duration: Duration) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current += duration;
    }

    /// Explicitly set the time
    ///
    /// Warning: setting time backwards makes "latest snapshot" queries
    /// disagree with insertion order.
    pub fn set_time(&self, time: Timestamp) {
        let mut current = self
            .current_time
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = time;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self
            .current_time
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn name(&self) -> &str {
        "ManualClock"
    }
}
