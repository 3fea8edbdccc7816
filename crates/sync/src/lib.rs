//! Tally Sync
//!
//! Ties the pipeline together:
//!
//! - **BalanceSync**: one fetch → normalize → save cycle
//! - **SyncScheduler**: runs a sync task on a fixed period in a background
//!   tokio task, with an explicit start/stop handle
//! - **BalanceQueries / PositionQueries**: the read path over the store and
//!   over live order history
//! - **PriceAlert**: polls one market until its price crosses a threshold
//! - **Pipeline**: config-driven bootstrap that pings the exchange first
//!
//! ## Sync Cycle
//!
//! ```text
//! SyncScheduler ──tick──► BalanceSync::sync_once
//!                              │
//!                              ├─► FetchOrchestrator::fetch_balances   (Err ─► abort)
//!                              ├─► RateResolver + BalanceNormalizer    (Err ─► abort)
//!                              └─► BalanceStore::save(snapshot rows)
//!
//! Errors are logged by the scheduler; the next tick starts from scratch.
//! ```

pub mod alert;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod scheduler;
pub mod service;

// Re-export main types
pub use alert::{PriceAlert, Threshold};
pub use config::{ConfigError, ExchangeCredentials, SyncConfig, load_config, load_config_from_str};
pub use error::{SyncError, SyncResult};
pub use pipeline::Pipeline;
pub use scheduler::SyncScheduler;
pub use service::{BalanceQueries, BalanceSync, PositionQueries};
