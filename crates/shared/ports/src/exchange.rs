use async_trait::async_trait;
use tally_core::{MarketQuote, RawBalance, RawOrder};

use crate::error::ExchangeResult;

/// Port for the upstream exchange API
///
/// Implementations own the wire format and authentication; everything they
/// return is already decoded into decimal-precision domain types.
#[async_trait]
pub trait ExchangeClient: Send + Sync {
    /// Identifier stored with every balance row (e.g. "bittrex")
    fn exchange_id(&self) -> &str;

    /// Wallet balances, one entry per currency (zero balances included)
    async fn balances(&self) -> ExchangeResult<Vec<RawBalance>>;

    /// Summaries of every listed market
    async fn market_summaries(&self) -> ExchangeResult<Vec<MarketQuote>>;

    /// Summary of a single market
    async fn market_summary(&self, pair_name: &str) -> ExchangeResult<MarketQuote>;

    /// Full order history for the account, newest first
    async fn order_history(&self) -> ExchangeResult<Vec<RawOrder>>;

    /// Liveness check used at startup to fail fast on bad credentials
    async fn ping(&self) -> ExchangeResult<()>;
}
