//! Tally Clock Infrastructure
//!
//! Time sources for the pipeline:
//!
//! - [`SystemClock`]: wall-clock UTC time, used in production
//! - [`ManualClock`]: frozen time that only moves when told to, used by
//!   tests that need deterministic snapshot timestamps and query windows
//!
//! ## Usage
//!
//! ```ignore
//! use tally_clock::{ManualClock, Clock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::at(start);
//! clock.advance(Duration::minutes(5));
//! assert_eq!(clock.now(), start + Duration::minutes(5));
//! ```

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;

// Re-export the Clock trait for convenience
pub use tally_ports::Clock;
