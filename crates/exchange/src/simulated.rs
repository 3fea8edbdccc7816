//! Simulated exchange
//!
//! In-memory [`ExchangeClient`] used by tests and dry runs. State can be
//! swapped between calls, any endpoint can be made to fail, and every call
//! can be delayed to observe concurrency.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use log::debug;
use tally_core::{MarketQuote, RawBalance, RawOrder};
use tally_ports::{ExchangeClient, ExchangeError, ExchangeResult};
use tokio::sync::RwLock;

/// Exchange API operations, for failure injection and call counting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Balances,
    MarketSummaries,
    MarketSummary,
    OrderHistory,
    Ping,
}

#[derive(Debug, Default)]
struct SimState {
    balances: Vec<RawBalance>,
    quotes: Vec<MarketQuote>,
    orders: Vec<RawOrder>,
    failures: HashMap<Endpoint, ExchangeError>,
}

/// Scriptable exchange
pub struct SimulatedExchange {
    exchange_id: String,
    state: RwLock<SimState>,
    /// Delay applied to every call
    latency: Option<Duration>,
    calls: DashMap<Endpoint, usize>,
}

impl SimulatedExchange {
    pub fn new(exchange_id: impl Into<String>) -> Self {
        Self {
            exchange_id: exchange_id.into(),
            state: RwLock::new(SimState::default()),
            latency: None,
            calls: DashMap::new(),
        }
    }

    pub fn with_balances(mut self, balances: Vec<RawBalance>) -> Self {
        self.state.get_mut().balances = balances;
        self
    }

    pub fn with_quotes(mut self, quotes: Vec<MarketQuote>) -> Self {
        self.state.get_mut().quotes = quotes;
        self
    }

    /// Orders must be given newest first
    pub fn with_orders(mut self, orders: Vec<RawOrder>) -> Self {
        self.state.get_mut().orders = orders;
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub async fn set_balances(&self, balances: Vec<RawBalance>) {
        self.state.write().await.balances = balances;
    }

    pub async fn set_quotes(&self, quotes: Vec<MarketQuote>) {
        self.state.write().await.quotes = quotes;
    }

    pub async fn set_orders(&self, orders: Vec<RawOrder>) {
        self.state.write().await.orders = orders;
    }

    /// Make every subsequent call to `endpoint` fail with `error`
    pub async fn fail(&self, endpoint: Endpoint, error: ExchangeError) {
        self.state.write().await.failures.insert(endpoint, error);
    }

    /// Undo `fail`
    pub async fn recover(&self, endpoint: Endpoint) {
        self.state.write().await.failures.remove(&endpoint);
    }

    /// How many times `endpoint` has been called, failures included
    pub fn call_count(&self, endpoint: Endpoint) -> usize {
        self.calls.get(&endpoint).map(|c| *c).unwrap_or(0)
    }

    /// Count the call, wait out the latency, then report any injected failure
    async fn enter(&self, endpoint: Endpoint) -> ExchangeResult<()> {
        *self.calls.entry(endpoint).or_insert(0) += 1;
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        match self.state.read().await.failures.get(&endpoint) {
            Some(err) => {
                debug!("[SIM] {:?} failing with {}", endpoint, err);
                Err(err.clone())
            }
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ExchangeClient for SimulatedExchange {
    fn exchange_id(&self) -> &str {
        &self.exchange_id
    }

    async fn balances(&self) -> ExchangeResult<Vec<RawBalance>> {
        self.enter(Endpoint::Balances).await?;
        Ok(self.state.read().await.balances.clone())
    }

    async fn market_summaries(&self) -> ExchangeResult<Vec<MarketQuote>> {
        self.enter(Endpoint::MarketSummaries).await?;
        Ok(self.state.read().await.quotes.clone())
    }

    async fn market_summary(&self, pair_name: &str) -> ExchangeResult<MarketQuote> {
        self.enter(Endpoint::MarketSummary).await?;
        self.state
            .read()
            .await
            .quotes
            .iter()
            .find(|q| q.is_pair(pair_name))
            .cloned()
            .ok_or_else(|| ExchangeError::EmptyResponse(format!("market summary {}", pair_name)))
    }

    async fn order_history(&self) -> ExchangeResult<Vec<RawOrder>> {
        self.enter(Endpoint::OrderHistory).await?;
        Ok(self.state.read().await.orders.clone())
    }

    async fn ping(&self) -> ExchangeResult<()> {
        self.enter(Endpoint::Ping).await?;
        // Probing uses the authenticated balances endpoint
        match self.state.read().await.failures.get(&Endpoint::Balances) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
