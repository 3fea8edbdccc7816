use serde::{Deserialize, Serialize};

use crate::values::{Amount, Rate, Timestamp};

/// Order direction as far as position reconciliation cares
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    Buy,
    Sell,
    /// Any order type string the exchange reports that is neither
    Other(String),
}

impl OrderKind {
    /// Map an exchange order type (`LIMIT_BUY`, `MARKET_SELL`, ...) to a kind
    pub fn from_exchange(order_type: &str) -> Self {
        let upper = order_type.to_ascii_uppercase();
        if upper.contains("BUY") {
            OrderKind::Buy
        } else if upper.contains("SELL") {
            OrderKind::Sell
        } else {
            OrderKind::Other(order_type.to_string())
        }
    }

    pub fn is_buy(&self) -> bool {
        matches!(self, OrderKind::Buy)
    }
}

/// Historical order as returned by the exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrder {
    /// Market pair name, `QUOTE-ASSET`
    pub market_pair: String,
    pub kind: OrderKind,
    /// Amount of the asset bought or sold
    pub quantity: Amount,
    /// Total price paid, in the quote currency
    pub price: Rate,
    pub timestamp: Timestamp,
}

impl RawOrder {
    pub fn new(
        market_pair: impl Into<String>,
        kind: OrderKind,
        quantity: Amount,
        price: Rate,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            market_pair: market_pair.into(),
            kind,
            quantity,
            price,
            timestamp,
        }
    }
}
