//! Order Reconciliation
//!
//! Derives open positions from a flat order history delivered newest-first.
//!
//! ## Algorithm
//!
//! Walk the history once, keeping a per-market "closed" flag:
//!
//! - market closed: skip the order
//! - buy: keep it as an open-position candidate
//! - anything else (sell, unknown type): close the market
//!
//! For each market this keeps exactly the run of buys that happened after
//! the most recent sell, i.e. what was bought since the position was last
//! liquidated.
//!
//! ```text
//! BTC-ETH:  BUY t=5 | SELL t=4 | BUY t=3 | BUY t=2
//!           keep      close      skip      skip
//! ```
//!
//! Unlike balance normalization, one bad order only drops that order.

use std::collections::HashSet;

use log::warn;
use rust_decimal::Decimal;
use tally_core::{MarketPair, OpenPosition, RawOrder};

use crate::error::MalformedOrder;
use crate::resolver::RateResolver;

/// Turns order history into open positions
#[derive(Debug, Clone)]
pub struct OrderReconciler {
    /// Unit each position's quote currency is valued in
    stable_unit: String,
}

impl OrderReconciler {
    pub fn new(stable_unit: impl Into<String>) -> Self {
        Self {
            stable_unit: stable_unit.into(),
        }
    }

    /// Buy orders not yet offset by a later non-buy on the same market
    ///
    /// `orders` must be newest-first. Output keeps the input order.
    pub fn open_buys(orders: &[RawOrder]) -> Vec<&RawOrder> {
        // Scoped to this call: every reconciliation starts with all markets open
        let mut closed: HashSet<String> = HashSet::new();
        let mut open = Vec::new();

        for order in orders {
            let market = order.market_pair.to_ascii_uppercase();
            if closed.contains(&market) {
                continue;
            }
            if order.kind.is_buy() {
                open.push(order);
            } else {
                closed.insert(market);
            }
        }

        open
    }

    /// Open positions with current sell and stable-unit rates attached
    pub fn open_positions(
        &self,
        exchange_id: &str,
        orders: &[RawOrder],
        resolver: &RateResolver,
    ) -> Vec<OpenPosition> {
        Self::open_buys(orders)
            .into_iter()
            .filter_map(|order| match self.to_position(exchange_id, order, resolver) {
                Ok(position) => Some(position),
                Err(e) => {
                    warn!("[RECONCILE] Dropping order on {}: {}", order.market_pair, e);
                    None
                }
            })
            .collect()
    }

    /// Price a single buy order against the snapshot
    pub fn to_position(
        &self,
        exchange_id: &str,
        order: &RawOrder,
        resolver: &RateResolver,
    ) -> Result<OpenPosition, MalformedOrder> {
        let pair = MarketPair::parse(&order.market_pair)
            .ok_or_else(|| MalformedOrder::UnparseablePair(order.market_pair.clone()))?;

        let buy_rate = order
            .price
            .checked_div(order.quantity)
            .ok_or_else(|| MalformedOrder::ZeroQuantity(order.market_pair.clone()))?;

        let unavailable = |source| MalformedOrder::RateUnavailable {
            pair: order.market_pair.clone(),
            source,
        };

        // The market's own bid: what one unit of the asset sells for in the quote currency
        let current_sell_rate = resolver
            .rate(&pair.asset, &pair.quote)
            .map_err(unavailable)?
            .bid;
        let stable_unit_rate = resolver
            .convert(&pair.quote, &self.stable_unit, Decimal::ONE)
            .map_err(unavailable)?;

        Ok(OpenPosition {
            exchange_id: exchange_id.to_string(),
            market_pair: order.market_pair.clone(),
            timestamp: order.timestamp,
            buy_rate,
            amount: order.quantity,
            current_sell_rate,
            stable_unit_rate,
        })
    }
}
