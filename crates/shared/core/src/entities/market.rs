use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Rate, Timestamp};

/// A listed market with its latest prices
///
/// Pair names follow the exchange convention `QUOTE-ASSET`, e.g. `BTC-ETH`
/// is ETH priced in BTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketQuote {
    pub pair_name: String,
    pub last: Rate,
    pub bid: Rate,
    pub ask: Rate,
}

impl MarketQuote {
    pub fn new(pair_name: impl Into<String>, last: Rate, bid: Rate, ask: Rate) -> Self {
        Self {
            pair_name: pair_name.into(),
            last,
            bid,
            ask,
        }
    }

    /// Quote with the same price on every side
    pub fn flat(pair_name: impl Into<String>, rate: Rate) -> Self {
        Self::new(pair_name, rate, rate, rate)
    }

    /// Case-insensitive pair name comparison
    pub fn is_pair(&self, pair_name: &str) -> bool {
        self.pair_name.eq_ignore_ascii_case(pair_name)
    }

    pub fn rates(&self) -> Rates {
        Rates {
            last: self.last,
            bid: self.bid,
            ask: self.ask,
        }
    }
}

/// The (last, bid, ask) triple for one currency direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rates {
    pub last: Rate,
    pub bid: Rate,
    pub ask: Rate,
}

impl Rates {
    /// Identity rates (converting a currency into itself)
    pub const IDENTITY: Rates = Rates {
        last: Decimal::ONE,
        bid: Decimal::ONE,
        ask: Decimal::ONE,
    };

    /// Multiplicative inverse of every rate
    ///
    /// Returns None if any rate is zero.
    pub fn inverse(&self) -> Option<Rates> {
        Some(Rates {
            last: Decimal::ONE.checked_div(self.last)?,
            bid: Decimal::ONE.checked_div(self.bid)?,
            ask: Decimal::ONE.checked_div(self.ask)?,
        })
    }
}

/// A market pair name split into its two currency codes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarketPair {
    /// Currency the market is priced in (first code)
    pub quote: String,
    /// Currency being traded (second code)
    pub asset: String,
}

impl MarketPair {
    pub fn new(quote: impl Into<String>, asset: impl Into<String>) -> Self {
        Self {
            quote: quote.into(),
            asset: asset.into(),
        }
    }

    /// Parse `QUOTE-ASSET`. Anything other than exactly two non-empty codes is rejected.
    pub fn parse(pair_name: &str) -> Option<Self> {
        let mut parts = pair_name.split('-');
        let quote = parts.next()?.trim();
        let asset = parts.next()?.trim();
        if parts.next().is_some() || quote.is_empty() || asset.is_empty() {
            return None;
        }
        Some(Self::new(quote, asset))
    }

    /// Pair name of the market converting `from` into `to`
    pub fn name_for(from: &str, to: &str) -> String {
        format!("{}-{}", to, from)
    }
}

impl std::fmt::Display for MarketPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.quote, self.asset)
    }
}

/// All market quotes captured at one instant
///
/// Built once per fetch cycle and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateSnapshot {
    quotes: Vec<MarketQuote>,
    captured_at: Timestamp,
}

impl RateSnapshot {
    pub fn new(quotes: Vec<MarketQuote>, captured_at: Timestamp) -> Self {
        Self {
            quotes,
            captured_at,
        }
    }

    pub fn quotes(&self) -> &[MarketQuote] {
        &self.quotes
    }

    pub fn captured_at(&self) -> Timestamp {
        self.captured_at
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}
