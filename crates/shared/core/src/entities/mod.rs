mod balance;
mod market;
mod order;
mod position;

pub use balance::{BalanceSnapshot, CurrencyBalance, RawBalance, StoredBalanceRow, TOTAL_CURRENCY};
pub use market::{MarketPair, MarketQuote, RateSnapshot, Rates};
pub use order::{OrderKind, RawOrder};
pub use position::OpenPosition;
