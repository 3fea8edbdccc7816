use chrono::{DateTime, Duration, Utc};
use tally_core::Timestamp;

/// Source of "now" for snapshot timestamps and query windows
///
/// Production uses wall-clock time; tests drive a manual clock so rate
/// snapshots and rollup windows are deterministic.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;

    /// Start of a window reaching `back` into the past
    ///
    /// Saturates at the earliest (or, for a negative `back`, latest)
    /// representable time.
    fn since(&self, back: Duration) -> Timestamp {
        self.now().checked_sub_signed(back).unwrap_or(if back < Duration::zero() {
            DateTime::<Utc>::MAX_UTC
        } else {
            DateTime::<Utc>::MIN_UTC
        })
    }

    /// Name for log lines
    fn name(&self) -> &str {
        "Clock"
    }
}
