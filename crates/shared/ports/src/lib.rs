//! Tally Ports
//!
//! Port definitions (traits) for the Tally wallet pipeline.
//! These define the boundaries between the normalization core and the
//! outside world: the exchange API, the snapshot store and the clock.

mod clock;
mod error;
mod exchange;
mod store;

pub use clock::Clock;
pub use error::{ExchangeError, ExchangeResult, StoreError, StoreResult};
pub use exchange::ExchangeClient;
pub use store::{BalanceStore, BucketSize};
