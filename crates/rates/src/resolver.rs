//! One-hop currency rate resolution
//!
//! A market `X-Y` prices Y in X. Converting `from` into `to` therefore looks
//! for the direct listing `to-from` first and falls back to the inverse
//! listing `from-to`. Nothing is chained through a third currency: a wallet
//! currency with no listing against the target simply cannot be converted.

use std::collections::HashMap;

use tally_core::{Amount, MarketPair, MarketQuote, RateSnapshot, Rates, Timestamp};

use crate::error::{RateError, RateResult};

/// Answers rate queries against one immutable snapshot
#[derive(Debug, Clone)]
pub struct RateResolver {
    snapshot: RateSnapshot,
    /// Upper-cased pair name -> position in the snapshot (first listing wins)
    index: HashMap<String, usize>,
}

impl RateResolver {
    pub fn new(snapshot: RateSnapshot) -> Self {
        let mut index = HashMap::with_capacity(snapshot.len());
        for (i, quote) in snapshot.quotes().iter().enumerate() {
            index
                .entry(quote.pair_name.to_ascii_uppercase())
                .or_insert(i);
        }
        Self { snapshot, index }
    }

    /// When the underlying market data was captured
    pub fn captured_at(&self) -> Timestamp {
        self.snapshot.captured_at()
    }

    /// Look up a listed market by name (case-insensitive)
    pub fn quote(&self, pair_name: &str) -> Option<&MarketQuote> {
        self.index
            .get(&pair_name.to_ascii_uppercase())
            .map(|&i| &self.snapshot.quotes()[i])
    }

    /// Rates for converting one unit of `from` into `to`
    pub fn rate(&self, from: &str, to: &str) -> RateResult<Rates> {
        if from.eq_ignore_ascii_case(to) {
            return Ok(Rates::IDENTITY);
        }

        if let Some(direct) = self.quote(&MarketPair::name_for(from, to)) {
            return Ok(direct.rates());
        }

        if let Some(inverse) = self.quote(&MarketPair::name_for(to, from)) {
            return inverse
                .rates()
                .inverse()
                .ok_or_else(|| RateError::DegenerateQuote {
                    pair: inverse.pair_name.clone(),
                });
        }

        Err(RateError::NoMarketFound {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// Convert `amount` of `from` into `to` at the last traded rate
    pub fn convert(&self, from: &str, to: &str, amount: Amount) -> RateResult<Amount> {
        let rates = self.rate(from, to)?;
        amount
            .checked_mul(rates.last)
            .ok_or_else(|| RateError::Overflow {
                from: from.to_string(),
                to: to.to_string(),
            })
    }
}
