use thiserror::Error;

/// Failures reported by the upstream exchange client
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Empty response for {0}")]
    EmptyResponse(String),
}

pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;

/// Failures of the balance snapshot store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Corrupt record at line {line}: {reason}")]
    Corrupt { line: usize, reason: String },

    #[error("No balance data found")]
    NoDataFound,
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
