use std::sync::Arc;

use async_trait::async_trait;
use chrono::Duration;
use dashmap::DashMap;
use log::debug;
use tally_core::StoredBalanceRow;
use tally_ports::{BalanceStore, BucketSize, Clock, StoreError, StoreResult};

use crate::rollup;

/// In-memory balance store
///
/// Rows are indexed by currency using DashMap. Clones share the same data.
#[derive(Clone)]
pub struct MemoryBalanceStore {
    /// currency -> rows in insertion order
    by_currency: Arc<DashMap<String, Vec<StoredBalanceRow>>>,
    clock: Arc<dyn Clock>,
}

impl MemoryBalanceStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            by_currency: Arc::new(DashMap::new()),
            clock,
        }
    }

    /// Index rows without any I/O
    pub(crate) fn insert(&self, rows: &[StoredBalanceRow]) {
        for row in rows {
            self.by_currency
                .entry(row.currency.clone())
                .or_default()
                .push(row.clone());
        }
    }

    /// Total number of rows held
    pub fn len(&self) -> usize {
        self.by_currency.iter().map(|e| e.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn save(&self, rows: &[StoredBalanceRow]) -> StoreResult<()> {
        self.insert(rows);
        debug!("[STORE] Saved {} rows", rows.len());
        Ok(())
    }

    async fn fetch_window(
        &self,
        currency: &str,
        back: Duration,
    ) -> StoreResult<Vec<StoredBalanceRow>> {
        let since = self.clock.since(back);
        Ok(self
            .by_currency
            .get(currency)
            .map(|rows| rollup::window(rows.value(), since))
            .unwrap_or_default())
    }

    async fn fetch_bucketed(
        &self,
        currency: &str,
        back: Duration,
        bucket: BucketSize,
    ) -> StoreResult<Vec<StoredBalanceRow>> {
        let since = self.clock.since(back);
        Ok(self
            .by_currency
            .get(currency)
            .map(|rows| rollup::bucketed(rows.value(), since, bucket))
            .unwrap_or_default())
    }

    async fn fetch_all(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        let mut rows = self
            .by_currency
            .get(currency)
            .map(|rows| rows.value().clone())
            .unwrap_or_default();
        rollup::sort_newest_first(&mut rows);
        Ok(rows)
    }

    async fn active_currencies(&self) -> StoreResult<Vec<StoredBalanceRow>> {
        let all: Vec<StoredBalanceRow> = self
            .by_currency
            .iter()
            .flat_map(|e| e.value().clone())
            .collect();
        let latest = rollup::latest_snapshot(&all);
        if latest.is_empty() {
            return Err(StoreError::NoDataFound);
        }
        Ok(latest)
    }
}
