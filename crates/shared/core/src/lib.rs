//! Tally Core Domain
//!
//! Pure domain types for the Tally wallet pipeline: market quotes, rate
//! snapshots, wallet balances, order history and the derived open positions.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    // Balances
    BalanceSnapshot,
    CurrencyBalance,
    // Market data
    MarketPair,
    MarketQuote,
    // Orders and positions
    OpenPosition,
    OrderKind,
    RateSnapshot,
    Rates,
    RawBalance,
    RawOrder,
    StoredBalanceRow,
    TOTAL_CURRENCY,
};
pub use values::{Amount, Currency, Rate, Timestamp};
