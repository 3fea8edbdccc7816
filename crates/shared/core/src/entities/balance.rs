use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::values::{Amount, Currency, Rate, Timestamp};

/// Currency code of the synthetic row carrying snapshot totals
pub const TOTAL_CURRENCY: &str = "total";

/// Wallet balance as reported by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawBalance {
    pub currency: Currency,
    pub amount: Amount,
}

impl RawBalance {
    pub fn new(currency: impl Into<Currency>, amount: Amount) -> Self {
        Self {
            currency: currency.into(),
            amount,
        }
    }
}

/// One wallet currency expressed in both target units
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrencyBalance {
    pub currency: Currency,
    /// Amount held, in the currency itself (always > 0)
    pub raw_amount: Amount,
    pub base_unit_amount: Amount,
    /// Last rate of the currency against the base unit
    pub base_unit_rate: Rate,
    pub stable_unit_amount: Amount,
}

/// Normalized wallet state for one exchange at one instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub exchange_id: String,
    /// Capture time of the market data used for conversion
    pub timestamp: Timestamp,
    pub currencies: Vec<CurrencyBalance>,
    pub total_base_unit_amount: Amount,
    pub total_stable_unit_amount: Amount,
}

impl BalanceSnapshot {
    /// Empty snapshot; totals grow through `push`
    pub fn new(exchange_id: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            timestamp,
            currencies: Vec::new(),
            total_base_unit_amount: Decimal::ZERO,
            total_stable_unit_amount: Decimal::ZERO,
        }
    }

    /// Append a currency and add it to the running totals
    ///
    /// Returns None, leaving the snapshot untouched, if a total would overflow.
    #[must_use]
    pub fn push(&mut self, balance: CurrencyBalance) -> Option<()> {
        let base = self
            .total_base_unit_amount
            .checked_add(balance.base_unit_amount)?;
        let stable = self
            .total_stable_unit_amount
            .checked_add(balance.stable_unit_amount)?;
        self.total_base_unit_amount = base;
        self.total_stable_unit_amount = stable;
        self.currencies.push(balance);
        Some(())
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    /// Flatten into storage rows: the `total` row first, then one row per currency
    pub fn to_rows(&self) -> Vec<StoredBalanceRow> {
        let mut rows = Vec::with_capacity(self.currencies.len() + 1);
        rows.push(StoredBalanceRow {
            exchange: self.exchange_id.clone(),
            currency: TOTAL_CURRENCY.to_string(),
            amount: self.total_base_unit_amount,
            base_unit_amount: self.total_base_unit_amount,
            base_unit_rate: Decimal::ONE,
            stable_unit_amount: self.total_stable_unit_amount,
            time: self.timestamp,
        });

        for c in &self.currencies {
            rows.push(StoredBalanceRow {
                exchange: self.exchange_id.clone(),
                currency: c.currency.clone(),
                amount: c.raw_amount,
                base_unit_amount: c.base_unit_amount,
                base_unit_rate: c.base_unit_rate,
                stable_unit_amount: c.stable_unit_amount,
                time: self.timestamp,
            });
        }
        rows
    }
}

/// Persisted, flattened balance row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredBalanceRow {
    pub exchange: String,
    pub currency: Currency,
    pub amount: Amount,
    pub base_unit_amount: Amount,
    pub base_unit_rate: Rate,
    pub stable_unit_amount: Amount,
    pub time: Timestamp,
}

impl StoredBalanceRow {
    pub fn is_total(&self) -> bool {
        self.currency == TOTAL_CURRENCY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn currency(code: &str, raw: Decimal, base: Decimal, stable: Decimal) -> CurrencyBalance {
        CurrencyBalance {
            currency: code.to_string(),
            raw_amount: raw,
            base_unit_amount: base,
            base_unit_rate: if raw.is_zero() { Decimal::ZERO } else { base / raw },
            stable_unit_amount: stable,
        }
    }

    #[test]
    fn test_push_accumulates_totals() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut snapshot = BalanceSnapshot::new("bittrex", ts);
        snapshot.push(currency("BTC", dec!(1000), dec!(1000), dec!(7.5))).unwrap();
        snapshot.push(currency("CUR1", dec!(2000), dec!(20000), dec!(150))).unwrap();

        assert_eq!(snapshot.total_base_unit_amount, dec!(21000));
        assert_eq!(snapshot.total_stable_unit_amount, dec!(157.5));
        assert_eq!(snapshot.currencies.len(), 2);
    }

    #[test]
    fn test_push_rejects_overflowing_totals() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut snapshot = BalanceSnapshot::new("bittrex", ts);
        snapshot
            .push(currency("BTC", Decimal::MAX, Decimal::MAX, dec!(1)))
            .unwrap();

        assert!(
            snapshot
                .push(currency("CUR1", dec!(1), dec!(1), dec!(1)))
                .is_none()
        );
        assert_eq!(snapshot.currencies.len(), 1);
        assert_eq!(snapshot.total_base_unit_amount, Decimal::MAX);
        assert_eq!(snapshot.total_stable_unit_amount, dec!(1));
    }

    #[test]
    fn test_to_rows_total_first() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut snapshot = BalanceSnapshot::new("bittrex", ts);
        snapshot.push(currency("CUR1", dec!(2000), dec!(20000), dec!(150))).unwrap();

        let rows = snapshot.to_rows();
        assert_eq!(rows.len(), 2);

        let total = &rows[0];
        assert!(total.is_total());
        assert_eq!(total.amount, dec!(20000));
        assert_eq!(total.base_unit_amount, dec!(20000));
        assert_eq!(total.base_unit_rate, Decimal::ONE);
        assert_eq!(total.stable_unit_amount, dec!(150));

        assert_eq!(rows[1].currency, "CUR1");
        assert_eq!(rows[1].amount, dec!(2000));
        assert_eq!(rows[1].base_unit_rate, dec!(10));
        assert!(rows.iter().all(|r| r.time == ts && r.exchange == "bittrex"));
    }

    #[test]
    fn test_empty_snapshot_still_has_total_row() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let snapshot = BalanceSnapshot::new("bittrex", ts);
        assert!(snapshot.is_empty());

        let rows = snapshot.to_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].amount, Decimal::ZERO);
    }

    #[test]
    fn test_row_serde_round_trip_keeps_decimals() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let mut snapshot = BalanceSnapshot::new("bittrex", ts);
        snapshot.push(currency("CUR1", dec!(0.00000001), dec!(0.0000001), dec!(0.00001))).unwrap();
        let row = snapshot.to_rows().remove(1);

        let json = serde_json::to_string(&row).unwrap();
        let back: StoredBalanceRow = serde_json::from_str(&json).unwrap();
        assert_eq!(back, row);
    }
}
