//! Tally Rates
//!
//! The algorithmic core of the pipeline. Everything here is synchronous and
//! operates on one [`RateSnapshot`](tally_core::RateSnapshot) captured during
//! a single fetch cycle:
//!
//! - **Rate Resolution**: one-hop lookup of last/bid/ask between two currencies
//! - **Balance Normalization**: wallet balances converted into a base unit and
//!   a stable unit, with exact decimal totals
//! - **Order Reconciliation**: buy orders not yet offset by a later sell
//!
//! ## Architecture
//!
//! ```text
//!  Market summaries ──► RateSnapshot ──► RateResolver
//!                                            │
//!                   ┌────────────────────────┴───────────────────────┐
//!                   ▼                                                ▼
//!  Raw balances ──► BalanceNormalizer              Order history ──► OrderReconciler
//!                   │                                                │
//!                   ▼                                                ▼
//!            BalanceSnapshot                                   OpenPosition[]
//!         (fails as a whole on any                       (bad orders dropped
//!          missing market)                                one at a time)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tally_rates::{BalanceNormalizer, ConversionTargets, RateResolver};
//!
//! let resolver = RateResolver::new(snapshot);
//! let normalizer = BalanceNormalizer::new(ConversionTargets::default());
//! let balance = normalizer.normalize("bittrex", &raw_balances, &resolver)?;
//! ```

pub mod error;
pub mod normalizer;
pub mod reconciler;
pub mod resolver;

// Re-export main types
pub use error::{ConversionError, MalformedOrder, RateError, RateResult};
pub use normalizer::{BalanceNormalizer, ConversionTargets};
pub use reconciler::OrderReconciler;
pub use resolver::RateResolver;
