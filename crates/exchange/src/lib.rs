//! Tally Exchange
//!
//! Retrieval side of the pipeline:
//!
//! - **FetchOrchestrator**: issues the independent exchange calls of one
//!   fetch cycle concurrently, waits for all of them, and folds every
//!   failure into a single [`FetchError`]
//! - **SimulatedExchange**: scriptable in-memory [`ExchangeClient`]
//!   (balances, quotes, orders, injected failures, artificial latency)
//!
//! ## Fetch Cycle
//!
//! ```text
//!              ┌──────────────── tokio::join! ────────────────┐
//!              │                                              │
//!   balances() ┤                                              ├─► BalanceInputs
//!              │   market_summaries() ─► RateSnapshot(now)    │
//!              └──────────────────────────────────────────────┘
//!                     any Err ─► FetchError { all errors }
//! ```
//!
//! The two calls race; neither waits for the other, so the rate snapshot
//! and the balances may be momentarily skewed.
//!
//! [`ExchangeClient`]: tally_ports::ExchangeClient

pub mod error;
pub mod orchestrator;
pub mod simulated;

// Re-export main types
pub use error::FetchError;
pub use orchestrator::{BalanceInputs, FetchOrchestrator, OrderInputs};
pub use simulated::{Endpoint, SimulatedExchange};
