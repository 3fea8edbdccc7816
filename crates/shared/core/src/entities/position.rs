use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::values::{Amount, Rate, Timestamp};

/// A buy that has not been followed by a sell on the same market
///
/// Derived on demand from order history, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub exchange_id: String,
    pub market_pair: String,
    pub timestamp: Timestamp,
    /// Price per unit paid (order price / quantity)
    pub buy_rate: Rate,
    pub amount: Amount,
    /// Current bid of the market, i.e. what one unit would sell for now
    pub current_sell_rate: Rate,
    /// Value of one unit of the quote currency in the stable unit
    pub stable_unit_rate: Rate,
}

impl OpenPosition {
    /// What was paid, in the quote currency
    pub fn buy_value(&self) -> Amount {
        self.buy_rate * self.amount
    }

    /// What the position would fetch at the current bid, in the quote currency
    pub fn sell_value(&self) -> Amount {
        self.current_sell_rate * self.amount
    }

    /// Profit in the quote currency if sold now, with `fee_rate` charged on both legs
    pub fn profit(&self, fee_rate: Decimal) -> Amount {
        let sell_net = self.sell_value() * (Decimal::ONE - fee_rate);
        let buy_gross = self.buy_value() * (Decimal::ONE + fee_rate);
        sell_net - buy_gross
    }

    pub fn stable_profit(&self, fee_rate: Decimal) -> Amount {
        self.profit(fee_rate) * self.stable_unit_rate
    }

    /// Profit relative to the gross buy cost, in percent
    pub fn profit_percent(&self, fee_rate: Decimal) -> Decimal {
        let buy_gross = self.buy_value() * (Decimal::ONE + fee_rate);
        if buy_gross.is_zero() {
            return Decimal::ZERO;
        }
        self.profit(fee_rate) / buy_gross * dec!(100)
    }
}
