//! Scripted venue and log capture for engine tests

use async_trait::async_trait;
use liquidator_core::{
    BalanceSnapshot, Error, MarketSymbol, OrderRequest, OrderResult, OrderStatus, Price,
    Quantity, Result, TickerSnapshot, Venue,
};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex};
use tracing::subscriber::DefaultGuard;
use tracing_subscriber::fmt::MakeWriter;

/// A call the engine made against the venue
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    FetchBalance,
    FetchTicker,
    CreateOrder(OrderRequest),
    FetchOrder(String),
}

/// Venue that answers from per-operation queues and records every call.
/// An empty queue answers with an error.
#[derive(Default)]
pub struct ScriptedVenue {
    balances: Mutex<VecDeque<Result<BalanceSnapshot>>>,
    tickers: Mutex<VecDeque<Result<Option<f64>>>>,
    creates: Mutex<VecDeque<Result<String>>>,
    orders: Mutex<VecDeque<Result<OrderResult>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedVenue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(self, grass: f64) -> Self {
        self.push(&self.balances, Ok(BalanceSnapshot::new().with_free("GRASS", grass)));
        self
    }

    pub fn empty_balance(self) -> Self {
        self.push(&self.balances, Ok(BalanceSnapshot::new().with_free("USDT", 100.0)));
        self
    }

    pub fn balance_error(self, times: usize) -> Self {
        for n in 0..times {
            self.push(&self.balances, Err(Error::NetworkError(format!("balance down #{}", n + 1))));
        }
        self
    }

    pub fn ticker(self, last: Option<f64>) -> Self {
        self.push(&self.tickers, Ok(last));
        self
    }

    pub fn ticker_error(self, times: usize) -> Self {
        for _ in 0..times {
            self.push(&self.tickers, Err(Error::ApiError("ticker down".to_string())));
        }
        self
    }

    pub fn accept(self, order_id: &str) -> Self {
        self.push(&self.creates, Ok(order_id.to_string()));
        self
    }

    pub fn create_error(self, times: usize) -> Self {
        for _ in 0..times {
            self.push(&self.creates, Err(Error::OrderRejected("51008".to_string())));
        }
        self
    }

    pub fn order(self, status: OrderStatus, filled: f64, amount: f64, average: f64) -> Self {
        let result = OrderResult {
            id: "scripted".to_string(),
            status,
            amount: Quantity::new(amount),
            filled: Quantity::new(filled),
            remaining: Quantity::new(amount - filled),
            average: (filled > 0.0).then_some(Price::new(average)),
            cost: filled * average,
        };
        self.push(&self.orders, Ok(result));
        self
    }

    pub fn order_error(self, times: usize) -> Self {
        for _ in 0..times {
            self.push(&self.orders, Err(Error::NetworkError("order lookup timeout".to_string())));
        }
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn placed_orders(&self) -> Vec<OrderRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::CreateOrder(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, wanted: fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| wanted(call)).count()
    }

    fn push<T>(&self, queue: &Mutex<VecDeque<Result<T>>>, value: Result<T>) {
        queue.lock().unwrap().push_back(value);
    }

    fn pop<T>(&self, queue: &Mutex<VecDeque<Result<T>>>, what: &str) -> Result<T> {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::Unknown(format!("no scripted {}", what))))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Venue for ScriptedVenue {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn fetch_balance(&self) -> Result<BalanceSnapshot> {
        self.record(Call::FetchBalance);
        self.pop(&self.balances, "balance")
    }

    async fn fetch_ticker(&self, symbol: &MarketSymbol) -> Result<TickerSnapshot> {
        self.record(Call::FetchTicker);
        let last = self.pop(&self.tickers, "ticker")?;
        Ok(TickerSnapshot::new(symbol.clone(), last.map(Price::new)))
    }

    async fn create_order(&self, request: &OrderRequest) -> Result<OrderResult> {
        self.record(Call::CreateOrder(request.clone()));
        let id = self.pop(&self.creates, "order acknowledgement")?;
        Ok(OrderResult::acknowledged(id, request.quantity))
    }

    async fn fetch_order(&self, order_id: &str, _symbol: &MarketSymbol) -> Result<OrderResult> {
        self.record(Call::FetchOrder(order_id.to_string()));
        let mut result = self.pop(&self.orders, "order result")?;
        result.id = order_id.to_string();
        Ok(result)
    }
}

/// Collects formatted log output for the current thread
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Route this thread's events here until the guard drops.
    /// Tokio tests run on a current-thread runtime, so async code is covered.
    pub fn install() -> (Self, DefaultGuard) {
        let logs = Self::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn lines_containing(&self, needle: &str) -> usize {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8_lossy(&bytes)
            .lines()
            .filter(|line| line.contains(needle))
            .count()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for CapturedLogs {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}
