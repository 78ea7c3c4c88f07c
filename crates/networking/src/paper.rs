//! Paper-trading venue for dry runs
//!
//! Market data comes from a wrapped venue; the account and order book
//! are simulated in memory. IOC limit sells fill at the limit price when
//! the limit is at or below the last traded price.

use async_trait::async_trait;
use liquidator_core::{
    BalanceSnapshot, Error, MarketSymbol, OrderRequest, OrderResult, OrderStatus,
    Price, Quantity, Result, TickerSnapshot, Venue,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::info;

#[derive(Debug, Default)]
struct PaperAccount {
    balances: HashMap<String, f64>,
    orders: HashMap<String, OrderResult>,
    next_order_id: u64,
}

/// Simulated account on top of a real market data source
pub struct PaperVenue<V: ?Sized> {
    market: Arc<V>,
    account: Mutex<PaperAccount>,
}

impl<V: Venue + ?Sized> PaperVenue<V> {
    pub fn new(market: Arc<V>) -> Self {
        Self {
            market,
            account: Mutex::new(PaperAccount {
                next_order_id: 1,
                ..PaperAccount::default()
            }),
        }
    }

    /// Start with a free balance of `quantity` in `asset`
    pub fn with_balance(self, asset: &str, quantity: f64) -> Self {
        if let Ok(mut account) = self.account.lock() {
            account
                .balances
                .insert(asset.to_ascii_uppercase(), quantity.max(0.0));
        }
        self
    }

    /// Credit a simulated deposit to the account
    pub fn credit(&self, asset: &str, quantity: f64) -> Result<()> {
        let mut account = self.lock()?;
        *account
            .balances
            .entry(asset.to_ascii_uppercase())
            .or_insert(0.0) += quantity.max(0.0);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, PaperAccount>> {
        self.account
            .lock()
            .map_err(|_| Error::Unknown("paper account lock poisoned".to_string()))
    }
}

impl PaperAccount {
    fn free(&self, asset: &str) -> f64 {
        self.balances.get(asset).copied().unwrap_or(0.0)
    }

    /// Match an IOC limit sell against the last traded price
    fn execute_sell(&mut self, request: &OrderRequest, last: Option<Price>) -> OrderResult {
        let id = format!("paper-{}", self.next_order_id);
        self.next_order_id += 1;

        let base = request.symbol.base().to_string();
        let quote = request.symbol.quote().to_string();
        let wanted = request.quantity.as_f64();

        let marketable = last.is_some_and(|last| request.price.as_f64() <= last.as_f64());
        let filled = if marketable {
            wanted.min(self.free(&base)).max(0.0)
        } else {
            0.0
        };

        let proceeds = filled * request.price.as_f64();
        if filled > 0.0 {
            *self.balances.entry(base).or_insert(0.0) -= filled;
            *self.balances.entry(quote).or_insert(0.0) += proceeds;
        }

        // IOC: anything not filled right now is canceled
        let status = if filled >= wanted {
            OrderStatus::Closed
        } else {
            OrderStatus::Canceled
        };

        OrderResult {
            id,
            status,
            amount: request.quantity,
            filled: Quantity::new(filled),
            remaining: Quantity::new((wanted - filled).max(0.0)),
            average: (filled > 0.0).then_some(request.price),
            cost: proceeds,
        }
    }
}

#[async_trait]
impl<V: Venue + ?Sized> Venue for PaperVenue<V> {
    fn name(&self) -> &str {
        "paper"
    }

    async fn fetch_balance(&self) -> Result<BalanceSnapshot> {
        let account = self.lock()?;
        Ok(account
            .balances
            .iter()
            .map(|(asset, quantity)| (asset.clone(), *quantity))
            .collect())
    }

    async fn fetch_ticker(&self, symbol: &MarketSymbol) -> Result<TickerSnapshot> {
        self.market.fetch_ticker(symbol).await
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResult> {
        if request.quantity.is_zero() {
            return Err(Error::InvalidData("Order quantity must be positive".to_string()));
        }

        // Fetch before locking; the guard must not live across an await
        let ticker = self.market.fetch_ticker(&request.symbol).await?;

        let mut account = self.lock()?;
        let result = account.execute_sell(request, ticker.last);

        info!(
            "Paper order {}: sell {} @ {} -> {} (filled {})",
            result.id, request.quantity, request.price, result.status, result.filled
        );

        let ack = OrderResult::acknowledged(result.id.clone(), request.quantity);
        account.orders.insert(result.id.clone(), result);
        Ok(ack)
    }

    async fn fetch_order(&self, order_id: &str, _symbol: &MarketSymbol) -> Result<OrderResult> {
        let account = self.lock()?;
        account
            .orders
            .get(order_id)
            .cloned()
            .ok_or_else(|| Error::OrderNotFound(order_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Market data source with a fixed last price
    struct FixedMarket(Option<f64>);

    #[async_trait]
    impl Venue for FixedMarket {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch_balance(&self) -> Result<BalanceSnapshot> {
            Ok(BalanceSnapshot::new())
        }

        async fn fetch_ticker(&self, symbol: &MarketSymbol) -> Result<TickerSnapshot> {
            Ok(TickerSnapshot::new(symbol.clone(), self.0.map(Price::new)))
        }

        async fn create_order(&self, _request: &OrderRequest) -> Result<OrderResult> {
            Err(Error::Unknown("market data only".to_string()))
        }

        async fn fetch_order(&self, order_id: &str, _symbol: &MarketSymbol) -> Result<OrderResult> {
            Err(Error::OrderNotFound(order_id.to_string()))
        }
    }

    fn symbol() -> MarketSymbol {
        MarketSymbol::new("GRASS", "USDT")
    }

    fn sell(quantity: f64, price: f64) -> OrderRequest {
        OrderRequest::ioc_limit_sell(symbol(), Quantity::new(quantity), Price::new(price))
    }

    #[tokio::test]
    async fn test_full_fill_moves_balances() {
        let venue = PaperVenue::new(Arc::new(FixedMarket(Some(1.25)))).with_balance("GRASS", 10.0);

        let ack = venue.create_order(&sell(10.0, 1.2)).await.unwrap();
        assert_eq!(ack.status, OrderStatus::Open);

        let result = venue.fetch_order(&ack.id, &symbol()).await.unwrap();
        assert_eq!(result.status, OrderStatus::Closed);
        assert_eq!(result.filled, Quantity::new(10.0));
        assert_eq!(result.cost, 12.0);

        let balance = venue.fetch_balance().await.unwrap();
        assert_eq!(balance.free("GRASS"), Quantity::ZERO);
        assert_eq!(balance.free("USDT"), Quantity::new(12.0));
    }

    #[tokio::test]
    async fn test_short_balance_is_partial_fill() {
        let venue = PaperVenue::new(Arc::new(FixedMarket(Some(2.0)))).with_balance("GRASS", 6.0);

        let ack = venue.create_order(&sell(10.0, 2.0)).await.unwrap();
        let result = venue.fetch_order(&ack.id, &symbol()).await.unwrap();

        assert_eq!(result.status, OrderStatus::Canceled);
        assert_eq!(result.filled, Quantity::new(6.0));
        assert_eq!(result.remaining, Quantity::new(4.0));
    }

    #[tokio::test]
    async fn test_limit_above_market_is_rejected() {
        let venue = PaperVenue::new(Arc::new(FixedMarket(Some(1.0)))).with_balance("GRASS", 10.0);

        let ack = venue.create_order(&sell(10.0, 1.5)).await.unwrap();
        let result = venue.fetch_order(&ack.id, &symbol()).await.unwrap();

        assert_eq!(result.status, OrderStatus::Canceled);
        assert_eq!(result.filled, Quantity::ZERO);
        assert_eq!(result.average, None);
        assert_eq!(venue.fetch_balance().await.unwrap().free("GRASS"), Quantity::new(10.0));
    }

    #[tokio::test]
    async fn test_unknown_order() {
        let venue = PaperVenue::new(Arc::new(FixedMarket(None)));
        let err = venue.fetch_order("nope", &symbol()).await.unwrap_err();
        assert!(matches!(err, Error::OrderNotFound(_)));
    }

    #[tokio::test]
    async fn test_deposit_after_sale_is_sellable() {
        let venue = PaperVenue::new(Arc::new(FixedMarket(Some(1.0)))).with_balance("GRASS", 5.0);

        let ack = venue.create_order(&sell(5.0, 1.0)).await.unwrap();
        assert_eq!(venue.fetch_order(&ack.id, &symbol()).await.unwrap().status, OrderStatus::Closed);

        venue.credit("grass", 4.0).unwrap();
        venue.credit("GRASS", 1.5).unwrap();
        assert_eq!(venue.fetch_balance().await.unwrap().free("GRASS"), Quantity::new(5.5));
    }
}
