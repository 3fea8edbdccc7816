//! Fetch Orchestrator
//!
//! Fan-out/fan-in over the exchange client. Each cycle issues a fixed set of
//! calls (never more than two at once), waits for all of them, and only
//! then hands the results on. A failed call never yields a partial result.

use std::sync::Arc;

use log::debug;
use tally_core::{MarketQuote, RateSnapshot, RawBalance, RawOrder};
use tally_ports::{Clock, ExchangeClient, ExchangeResult};

use crate::error::FetchError;

/// Inputs for balance normalization from one fetch cycle
#[derive(Debug, Clone)]
pub struct BalanceInputs {
    pub balances: Vec<RawBalance>,
    pub rates: RateSnapshot,
}

/// Inputs for order reconciliation from one fetch cycle
#[derive(Debug, Clone)]
pub struct OrderInputs {
    /// Newest first, as delivered by the exchange
    pub orders: Vec<RawOrder>,
    pub rates: RateSnapshot,
}

/// Runs the exchange calls of one fetch cycle concurrently
pub struct FetchOrchestrator {
    client: Arc<dyn ExchangeClient>,
    clock: Arc<dyn Clock>,
}

impl FetchOrchestrator {
    pub fn new(client: Arc<dyn ExchangeClient>, clock: Arc<dyn Clock>) -> Self {
        Self { client, clock }
    }

    pub fn exchange_id(&self) -> &str {
        self.client.exchange_id()
    }

    /// Liveness check
    pub async fn ping(&self) -> ExchangeResult<()> {
        self.client.ping().await
    }

    /// Current quote of a single market
    pub async fn market_quote(&self, pair_name: &str) -> ExchangeResult<MarketQuote> {
        self.client.market_summary(pair_name).await
    }

    /// All market summaries, stamped with the time they arrived
    pub async fn rate_snapshot(&self) -> ExchangeResult<RateSnapshot> {
        let quotes = self.client.market_summaries().await?;
        let captured_at = self.clock.now();
        debug!(
            "[FETCH] {} market summaries from {} at {}",
            quotes.len(),
            self.exchange_id(),
            captured_at
        );
        Ok(RateSnapshot::new(quotes, captured_at))
    }

    /// Balances and market rates, fetched concurrently
    pub async fn fetch_balances(&self) -> Result<BalanceInputs, FetchError> {
        let (rates, balances) = tokio::join!(self.rate_snapshot(), self.client.balances());
        let (rates, balances) = join_results(rates, balances)?;
        debug!(
            "[FETCH] {} balances from {}",
            balances.len(),
            self.exchange_id()
        );
        Ok(BalanceInputs { balances, rates })
    }

    /// Order history and market rates, fetched concurrently
    pub async fn fetch_orders(&self) -> Result<OrderInputs, FetchError> {
        let (rates, orders) = tokio::join!(self.rate_snapshot(), self.client.order_history());
        let (rates, orders) = join_results(rates, orders)?;
        debug!("[FETCH] {} orders from {}", orders.len(), self.exchange_id());
        Ok(OrderInputs { orders, rates })
    }
}

/// Both values, or every error that occurred
fn join_results<A, B>(a: ExchangeResult<A>, b: ExchangeResult<B>) -> Result<(A, B), FetchError> {
    match (a, b) {
        (Ok(a), Ok(b)) => Ok((a, b)),
        (a, b) => {
            let errors = [a.err(), b.err()].into_iter().flatten().collect();
            Err(FetchError::new(errors))
        }
    }
}
