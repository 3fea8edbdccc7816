use async_trait::async_trait;
use chrono::Duration;
use tally_core::StoredBalanceRow;

use crate::error::StoreResult;

/// Time bucket used by rollup queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BucketSize {
    /// (year, month, day, hour, minute / 5)
    FiveMinutes,
    /// (year, month, day, hour)
    OneHour,
}

/// Port for persisted balance snapshots
///
/// Rows are append-only. All time windows are measured back from the
/// store's own notion of "now".
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Append rows; no dedup, no overwrite
    async fn save(&self, rows: &[StoredBalanceRow]) -> StoreResult<()>;

    /// Raw rows for `currency` no older than `back`, newest first
    async fn fetch_window(
        &self,
        currency: &str,
        back: Duration,
    ) -> StoreResult<Vec<StoredBalanceRow>>;

    /// One representative row per bucket within `back`, newest first
    async fn fetch_bucketed(
        &self,
        currency: &str,
        back: Duration,
        bucket: BucketSize,
    ) -> StoreResult<Vec<StoredBalanceRow>>;

    /// Every row for `currency`, newest first
    async fn fetch_all(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>>;

    /// All rows sharing the most recent timestamp in the store
    ///
    /// Fails with `StoreError::NoDataFound` when the store is empty.
    async fn active_currencies(&self) -> StoreResult<Vec<StoredBalanceRow>>;

    /// All rows from the last `hours` hours
    ///
    /// Spans too large for a `Duration` saturate instead of failing.
    async fn fetch_hourly(&self, currency: &str, hours: i64) -> StoreResult<Vec<StoredBalanceRow>> {
        let back = Duration::try_hours(hours).unwrap_or(if hours < 0 {
            Duration::MIN
        } else {
            Duration::MAX
        });
        self.fetch_window(currency, back).await
    }

    /// Last 7 days at 5-minute resolution
    async fn fetch_weekly(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        self.fetch_bucketed(currency, Duration::days(7), BucketSize::FiveMinutes)
            .await
    }

    /// Last 30 days at 1-hour resolution
    async fn fetch_monthly(&self, currency: &str) -> StoreResult<Vec<StoredBalanceRow>> {
        self.fetch_bucketed(currency, Duration::days(30), BucketSize::OneHour)
            .await
    }
}
