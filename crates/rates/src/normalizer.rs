//! Balance Normalization
//!
//! Converts raw wallet balances into the two reporting units:
//!
//! 1. **Base unit**: `convert(currency, BASE)`
//! 2. **Stable unit**: `convert(BASE, STABLE)` applied to the base amount
//!
//! A currency without a market against the base unit fails the whole
//! snapshot. Returning the other currencies would silently understate the
//! totals, so the caller gets nothing instead.

use log::debug;
use rust_decimal::Decimal;
use tally_core::{BalanceSnapshot, CurrencyBalance, RawBalance};

use crate::error::{ConversionError, RateError};
use crate::resolver::RateResolver;

/// The two units every balance is expressed in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTargets {
    /// Settlement currency (e.g. BTC)
    pub base: String,
    /// Fiat-pegged currency (e.g. USDT)
    pub stable: String,
}

impl ConversionTargets {
    pub fn new(base: impl Into<String>, stable: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            stable: stable.into(),
        }
    }
}

impl Default for ConversionTargets {
    fn default() -> Self {
        Self::new("BTC", "USDT")
    }
}

/// Builds balance snapshots from raw balances and one rate snapshot
#[derive(Debug, Clone, Default)]
pub struct BalanceNormalizer {
    targets: ConversionTargets,
}

impl BalanceNormalizer {
    pub fn new(targets: ConversionTargets) -> Self {
        Self { targets }
    }

    pub fn targets(&self) -> &ConversionTargets {
        &self.targets
    }

    /// Normalize every positive balance
    ///
    /// The snapshot is stamped with the capture time of the market data so
    /// balances and rates share one temporal reference.
    pub fn normalize(
        &self,
        exchange_id: &str,
        balances: &[RawBalance],
        resolver: &RateResolver,
    ) -> Result<BalanceSnapshot, ConversionError> {
        let mut snapshot = BalanceSnapshot::new(exchange_id, resolver.captured_at());

        for balance in balances {
            if balance.amount <= Decimal::ZERO {
                continue;
            }
            let converted = self.normalize_one(balance, resolver)?;
            debug!(
                "[NORMALIZE] {} {} -> {} {} / {} {}",
                converted.raw_amount,
                converted.currency,
                converted.base_unit_amount,
                self.targets.base,
                converted.stable_unit_amount,
                self.targets.stable
            );
            let currency = converted.currency.clone();
            snapshot
                .push(converted)
                .ok_or_else(|| ConversionError {
                    source: RateError::Overflow {
                        from: currency.clone(),
                        to: self.targets.base.clone(),
                    },
                    currency,
                })?;
        }

        Ok(snapshot)
    }

    fn normalize_one(
        &self,
        balance: &RawBalance,
        resolver: &RateResolver,
    ) -> Result<CurrencyBalance, ConversionError> {
        let fail = |source| ConversionError {
            currency: balance.currency.clone(),
            source,
        };

        let base = &self.targets.base;
        let base_unit_amount = resolver
            .convert(&balance.currency, base, balance.amount)
            .map_err(fail)?;
        let stable_unit_amount = resolver
            .convert(base, &self.targets.stable, base_unit_amount)
            .map_err(fail)?;
        let base_unit_rate = resolver.rate(&balance.currency, base).map_err(fail)?.last;

        Ok(CurrencyBalance {
            currency: balance.currency.clone(),
            raw_amount: balance.amount,
            base_unit_amount,
            base_unit_rate,
            stable_unit_amount,
        })
    }
}
