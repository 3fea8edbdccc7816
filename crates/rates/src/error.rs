//! Rate resolution errors

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateError {
    #[error("Neither market '{to}-{from}' nor '{from}-{to}' found in markets")]
    NoMarketFound { from: String, to: String },

    #[error("Market {pair} has a zero rate and cannot be inverted")]
    DegenerateQuote { pair: String },

    #[error("Converting {from} into {to} overflows")]
    Overflow { from: String, to: String },
}

pub type RateResult<T> = std::result::Result<T, RateError>;

/// A wallet currency that could not be expressed in the target units
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot convert {currency}: {source}")]
pub struct ConversionError {
    pub currency: String,
    pub source: RateError,
}

/// Reason a single order was left out of the open positions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MalformedOrder {
    #[error("Market name '{0}' can't be parsed to QUOTE-ASSET format")]
    UnparseablePair(String),

    #[error("Order on {0} has zero quantity")]
    ZeroQuantity(String),

    #[error("No rate for market {pair}: {source}")]
    RateUnavailable { pair: String, source: RateError },
}
