//! Price threshold alert
//!
//! Polls one market on a fixed period until its last price crosses a
//! threshold, then hands back the quote that crossed it and stops.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use rust_decimal::Decimal;
use tally_core::{MarketQuote, Rate};
use tally_exchange::FetchOrchestrator;
use tally_ports::ExchangeResult;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::config::ConfigError;

/// Price level that fires an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Fires when `last >= level`
    Above(Rate),
    /// Fires when `last <= level`
    Below(Rate),
}

impl Threshold {
    /// Build from `--gt` / `--lt` style bounds, where zero means unset
    ///
    /// Exactly one bound must be positive and neither may be negative.
    pub fn from_bounds(greater_than: Decimal, less_than: Decimal) -> Result<Self, ConfigError> {
        if greater_than < Decimal::ZERO {
            return Err(ConfigError::Invalid("--gt must be (0, ∞)".to_string()));
        }
        if less_than < Decimal::ZERO {
            return Err(ConfigError::Invalid("--lt must be (0, ∞)".to_string()));
        }
        match (greater_than.is_zero(), less_than.is_zero()) {
            (true, true) => Err(ConfigError::Invalid(
                "--gt or --lt must be defined".to_string(),
            )),
            (false, false) => Err(ConfigError::Invalid(
                "only one of --gt or --lt must be defined".to_string(),
            )),
            (false, true) => Ok(Threshold::Above(greater_than)),
            (true, false) => Ok(Threshold::Below(less_than)),
        }
    }

    pub fn is_reached(&self, last: Rate) -> bool {
        match *self {
            Threshold::Above(level) => last >= level,
            Threshold::Below(level) => last <= level,
        }
    }
}

/// Watches one market for a threshold crossing
pub struct PriceAlert {
    market: String,
    threshold: Threshold,
    fetcher: Arc<FetchOrchestrator>,
}

impl PriceAlert {
    pub fn new(
        market: impl Into<String>,
        threshold: Threshold,
        fetcher: Arc<FetchOrchestrator>,
    ) -> Self {
        Self {
            market: market.into(),
            threshold,
            fetcher,
        }
    }

    /// One poll: the quote if the threshold is reached
    pub async fn check(&self) -> ExchangeResult<Option<MarketQuote>> {
        let quote = self.fetcher.market_quote(&self.market).await?;
        debug!("[ALERT] {} last {}", self.market, quote.last);
        Ok(self.threshold.is_reached(quote.last).then_some(quote))
    }

    /// Poll every `period` until the threshold is reached
    ///
    /// The first poll happens one period from now. Failed polls are logged
    /// and retried on the next tick.
    pub async fn watch(&self, period: Duration) -> MarketQuote {
        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            match self.check().await {
                Ok(Some(quote)) => {
                    info!(
                        "[ALERT] {} reached price {} ({:?})",
                        self.market, quote.last, self.threshold
                    );
                    return quote;
                }
                Ok(None) => {}
                Err(e) => error!("[ALERT] Quote for {} failed: {}", self.market, e),
            }
        }
    }
}
