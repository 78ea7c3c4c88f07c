//! Trading venue capability set

use crate::{BalanceSnapshot, MarketSymbol, OrderRequest, OrderResult, Result, TickerSnapshot};
use async_trait::async_trait;

/// Remote operations the liquidator needs from a trading venue.
///
/// Every call is fallible and may suspend. Implementations hold their own
/// credentials; callers never see them.
#[async_trait]
pub trait Venue: Send + Sync {
    /// Human-readable venue name for logs
    fn name(&self) -> &str;

    async fn fetch_balance(&self) -> Result<BalanceSnapshot>;

    async fn fetch_ticker(&self, symbol: &MarketSymbol) -> Result<TickerSnapshot>;

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResult>;

    async fn fetch_order(&self, order_id: &str, symbol: &MarketSymbol) -> Result<OrderResult>;
}
