//! Pipeline bootstrap
//!
//! Wires one exchange client and one store into the sync and read services.

use std::sync::Arc;

use log::{info, warn};
use tally_clock::SystemClock;
use tally_exchange::FetchOrchestrator;
use tally_ports::{BalanceStore, Clock, ExchangeClient};
use tally_rates::{BalanceNormalizer, OrderReconciler};

use crate::alert::{PriceAlert, Threshold};
use crate::config::SyncConfig;
use crate::error::SyncResult;
use crate::scheduler::SyncScheduler;
use crate::service::{BalanceQueries, BalanceSync, PositionQueries};

pub struct Pipeline {
    pub config: SyncConfig,
    pub fetcher: Arc<FetchOrchestrator>,
    pub sync: Arc<BalanceSync>,
    pub balances: BalanceQueries,
    pub positions: PositionQueries,
    /// Not started; call `scheduler.start()` to begin syncing
    pub scheduler: SyncScheduler,
}

impl Pipeline {
    /// Validate config, ping the exchange, then wire everything up
    pub async fn connect(
        config: SyncConfig,
        client: Arc<dyn ExchangeClient>,
        store: Arc<dyn BalanceStore>,
    ) -> SyncResult<Self> {
        Self::connect_with_clock(config, client, store, Arc::new(SystemClock::new())).await
    }

    pub async fn connect_with_clock(
        config: SyncConfig,
        client: Arc<dyn ExchangeClient>,
        store: Arc<dyn BalanceStore>,
        clock: Arc<dyn Clock>,
    ) -> SyncResult<Self> {
        config.validate()?;

        // Fail fast on bad credentials
        client.ping().await?;
        if client.exchange_id() != config.exchange_id {
            warn!(
                "[SYNC] Client reports exchange '{}' but config names '{}'",
                client.exchange_id(),
                config.exchange_id
            );
        }

        let fetcher = Arc::new(FetchOrchestrator::new(client, clock));
        let sync = Arc::new(BalanceSync::new(
            Arc::clone(&fetcher),
            BalanceNormalizer::new(config.targets()),
            Arc::clone(&store),
        ));
        let scheduler = SyncScheduler::for_sync(config.period(), Arc::clone(&sync));

        info!(
            "[SYNC] Connected to {} ({} / {}, every {:?})",
            fetcher.exchange_id(),
            config.base_unit,
            config.stable_unit,
            config.period()
        );

        Ok(Self {
            balances: BalanceQueries::new(store),
            positions: PositionQueries::new(
                Arc::clone(&fetcher),
                OrderReconciler::new(&config.stable_unit),
            ),
            fetcher,
            sync,
            scheduler,
            config,
        })
    }

    /// Alert on `market` sharing this pipeline's exchange connection
    pub fn price_alert(&self, market: impl Into<String>, threshold: Threshold) -> PriceAlert {
        PriceAlert::new(market, threshold, Arc::clone(&self.fetcher))
    }
}
