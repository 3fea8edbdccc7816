//! Sync errors

use tally_exchange::FetchError;
use tally_ports::{ExchangeError, StoreError};
use tally_rates::ConversionError;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Normalization failed: {0}")]
    Conversion(#[from] ConversionError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] ExchangeError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scheduler is already started")]
    AlreadyStarted,
}

pub type SyncResult<T> = std::result::Result<T, SyncError>;
