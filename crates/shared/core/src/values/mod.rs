use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Exchange rate between two currencies - uses Decimal so chained
/// conversions (inversion, two-stage conversion) do not drift
pub type Rate = Decimal;

/// Currency amount
pub type Amount = Decimal;

/// Timestamp in UTC
pub type Timestamp = DateTime<Utc>;

/// Currency code as listed by the exchange (e.g. "BTC", "USDT")
pub type Currency = String;
