//! Sync and read services
//!
//! Thin orchestration over the rates core: no state of their own beyond the
//! shared fetcher and store handles.

use std::sync::Arc;

use log::{Level, debug, error, info, log_enabled, warn};
use tally_core::{BalanceSnapshot, MarketQuote, OpenPosition, StoredBalanceRow};
use tally_exchange::{FetchError, FetchOrchestrator};
use tally_ports::{BalanceStore, ExchangeResult, StoreError, StoreResult};
use tally_rates::{BalanceNormalizer, OrderReconciler, RateResolver};

use crate::error::SyncResult;

/// One balance sync cycle: fetch, normalize, persist
pub struct BalanceSync {
    fetcher: Arc<FetchOrchestrator>,
    normalizer: BalanceNormalizer,
    store: Arc<dyn BalanceStore>,
}

impl BalanceSync {
    pub fn new(
        fetcher: Arc<FetchOrchestrator>,
        normalizer: BalanceNormalizer,
        store: Arc<dyn BalanceStore>,
    ) -> Self {
        Self {
            fetcher,
            normalizer,
            store,
        }
    }

    /// Run one cycle and return the snapshot that was persisted
    ///
    /// Any fetch or conversion failure aborts before the store is touched.
    /// A wallet with no positive balances yields an empty snapshot and
    /// writes nothing.
    pub async fn sync_once(&self) -> SyncResult<BalanceSnapshot> {
        let exchange_id = self.fetcher.exchange_id();
        let inputs = self.fetcher.fetch_balances().await?;
        let resolver = RateResolver::new(inputs.rates);
        let snapshot = self
            .normalizer
            .normalize(exchange_id, &inputs.balances, &resolver)?;

        if log_enabled!(Level::Debug) {
            match serde_json::to_string_pretty(&snapshot) {
                Ok(json) => debug!("[SYNC] Balance snapshot:\n{}", json),
                Err(e) => debug!("[SYNC] Balance snapshot not printable: {}", e),
            }
        }

        if snapshot.is_empty() {
            warn!("[SYNC] No positive balances on {}, nothing saved", exchange_id);
            return Ok(snapshot);
        }

        let rows = snapshot.to_rows();
        self.store.save(&rows).await?;
        info!(
            "[SYNC] Saved {} rows for {}: {} {} / {} {}",
            rows.len(),
            exchange_id,
            snapshot.total_base_unit_amount,
            self.normalizer.targets().base,
            snapshot.total_stable_unit_amount,
            self.normalizer.targets().stable
        );
        Ok(snapshot)
    }
}

/// Read path over persisted snapshots
#[derive(Clone)]
pub struct BalanceQueries {
    store: Arc<dyn BalanceStore>,
}

impl BalanceQueries {
    pub fn new(store: Arc<dyn BalanceStore>) -> Self {
        Self { store }
    }

    /// Raw rows for the last `hours` hours
    pub async fn fetch_window(
        &self,
        currency: &str,
        hours: i64,
    ) -> StoreResult<Vec<StoredBalanceRow>> {
        logged("fetch_window", self.store.fetch_hourly(currency, hours).await)
    }

    pub async fn fetch_weekly(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        logged("fetch_weekly", self.store.fetch_weekly(currency).await)
    }

    pub async fn fetch_monthly(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        logged("fetch_monthly", self.store.fetch_monthly(currency).await)
    }

    pub async fn fetch_all(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        logged("fetch_all", self.store.fetch_all(currency).await)
    }

    /// Rows of the most recent snapshot
    pub async fn active_currencies(&self) -> StoreResult<Vec<StoredBalanceRow>> {
        logged("active_currencies", self.store.active_currencies().await)
    }
}

fn logged<T>(query: &str, result: StoreResult<T>) -> StoreResult<T> {
    match &result {
        // An empty store is an expected answer
        Err(StoreError::NoDataFound) => debug!("[STORE] {}: no data", query),
        Err(e) => error!("[STORE] {} failed: {}", query, e),
        Ok(_) => {}
    }
    result
}

/// Read path over live order history
pub struct PositionQueries {
    fetcher: Arc<FetchOrchestrator>,
    reconciler: OrderReconciler,
}

impl PositionQueries {
    pub fn new(fetcher: Arc<FetchOrchestrator>, reconciler: OrderReconciler) -> Self {
        Self {
            fetcher,
            reconciler,
        }
    }

    /// Buy orders not yet sold, valued at current rates
    pub async fn open_positions(&self) -> Result<Vec<OpenPosition>, FetchError> {
        let inputs = self.fetcher.fetch_orders().await?;
        let resolver = RateResolver::new(inputs.rates);
        let positions =
            self.reconciler
                .open_positions(self.fetcher.exchange_id(), &inputs.orders, &resolver);
        debug!(
            "[RECONCILE] {} open positions out of {} orders",
            positions.len(),
            inputs.orders.len()
        );
        Ok(positions)
    }

    /// Current quote of one market
    pub async fn market_quote(&self, pair_name: &str) -> ExchangeResult<MarketQuote> {
        self.fetcher.market_quote(pair_name).await
    }
}
