//! Liquidation engine: the inner sell loop of a session
//!
//! ```text
//! AwaitingOrder -> OrderPlaced -> Closed          (drained, ends)
//!                              -> PartiallyFilled (resync balance, loops)
//!                              -> FullyCanceled   (rejected, ends)
//!                              -> Indeterminate   (same quantity again, loops)
//! ```
//!
//! The loop also ends once the remaining quantity drops below the
//! execution threshold, or when a venue call exhausts its retries.

use crate::retry::{RetriesExhausted, RetryExecutor};
use crate::session::LiquidationSession;
use liquidator_core::{MarketSymbol, OrderResult, OrderStatus, Price, Quantity, Venue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// Where a polled order result sends the session
#[derive(Debug, Clone, PartialEq)]
pub enum OrderTransition {
    /// Fully executed; nothing left to sell
    Drained,
    /// Canceled after filling part of the quantity
    PartiallyFilled,
    /// Canceled without filling anything
    Rejected,
    /// Any other status, e.g. still open
    Indeterminate(OrderStatus),
}

/// Map an order result onto the transition table
pub fn classify(result: &OrderResult) -> OrderTransition {
    match &result.status {
        OrderStatus::Closed => OrderTransition::Drained,
        OrderStatus::Canceled if !result.filled.is_zero() => OrderTransition::PartiallyFilled,
        OrderStatus::Canceled => OrderTransition::Rejected,
        other => OrderTransition::Indeterminate(other.clone()),
    }
}

/// Why a session ended
#[derive(Debug)]
pub enum SessionOutcome {
    /// The whole balance was sold
    Drained,
    /// What is left is too small to place another order
    BelowExecutionThreshold,
    /// An order came back canceled with nothing filled
    Rejected,
    /// A venue call failed on every attempt
    Aborted(RetriesExhausted),
}

/// Summary of a finished session
#[derive(Debug)]
pub struct SessionReport {
    pub symbol: MarketSymbol,
    pub price: Price,
    pub orders_placed: u32,
    pub total_filled: Quantity,
    pub total_proceeds: f64,
    pub remaining: Quantity,
    pub outcome: SessionOutcome,
}

impl SessionReport {
    fn new(session: &LiquidationSession, outcome: SessionOutcome) -> Self {
        Self {
            symbol: session.symbol().clone(),
            price: session.price(),
            orders_placed: session.orders_placed(),
            total_filled: session.total_filled(),
            total_proceeds: session.total_proceeds(),
            remaining: session.remaining(),
            outcome,
        }
    }
}

/// Drives one session at a time against a venue
pub struct LiquidationEngine<V: ?Sized> {
    venue: Arc<V>,
    retry: RetryExecutor,
    order_interval: Duration,
}

impl<V: Venue + ?Sized> LiquidationEngine<V> {
    pub fn new(venue: Arc<V>, retry: RetryExecutor, order_interval: Duration) -> Self {
        Self {
            venue,
            retry,
            order_interval,
        }
    }

    /// Sell until the session drains, is rejected, aborts, or falls below
    /// the execution threshold. Never fails: venue failures end the session.
    pub async fn run(&self, session: LiquidationSession) -> SessionReport {
        let mut session = session;

        info!(
            "Detected {} {}. Starting sale at {} {}...",
            session.remaining(),
            session.symbol().base(),
            session.price(),
            session.symbol().quote()
        );

        let outcome = loop {
            if !session.can_execute() {
                break if session.is_drained() {
                    SessionOutcome::Drained
                } else {
                    SessionOutcome::BelowExecutionThreshold
                };
            }

            let result = match self.place_and_poll(&session).await {
                Ok(result) => result,
                Err(e) => {
                    error!("Error while placing order: {}", e);
                    break SessionOutcome::Aborted(e);
                }
            };

            let transition = classify(&result);
            session = session.record(&result);

            match transition {
                OrderTransition::Drained => {
                    info!(
                        "Order fully executed: sold {} {} for a total of {} {} at an average price of {} per token.",
                        result.amount,
                        session.symbol().base(),
                        result.cost,
                        session.symbol().quote(),
                        fmt_average(&result)
                    );
                    session = session.drained();
                }
                OrderTransition::PartiallyFilled => {
                    info!(
                        "Order partially executed: sold {} {} for a total of {} {} at an average price of {} per token. \
                         Remaining {} {} was not executed and was canceled.",
                        result.filled,
                        session.symbol().base(),
                        result.cost,
                        session.symbol().quote(),
                        fmt_average(&result),
                        result.remaining,
                        session.symbol().base()
                    );

                    match self.resync(&session).await {
                        Ok(next) => session = next,
                        Err(e) => {
                            error!("Error while placing order: {}", e);
                            break SessionOutcome::Aborted(e);
                        }
                    }
                }
                OrderTransition::Rejected => {
                    warn!("Order was not executed and was canceled.");
                    break SessionOutcome::Rejected;
                }
                OrderTransition::Indeterminate(status) => {
                    // TODO: resync the balance here too once it is clear whether an open IOC
                    // order can still be holding part of the quantity
                    info!("Order status: {}.", status);
                }
            }

            tokio::time::sleep(self.order_interval).await;
        };

        info!("Sale finished or no more tokens available for sale.");
        SessionReport::new(&session, outcome)
    }

    /// Submit the next order and read back its final state
    async fn place_and_poll(&self, session: &LiquidationSession) -> Result<OrderResult, RetriesExhausted> {
        let request = session.next_order();

        let ack = self
            .retry
            .run("create_order", || self.venue.create_order(&request))
            .await?;

        self.retry
            .run("fetch_order", || self.venue.fetch_order(&ack.id, &request.symbol))
            .await
    }

    /// Take the venue's free balance as the new remaining quantity, which
    /// absorbs fees and rounding the order result does not show
    async fn resync(&self, session: &LiquidationSession) -> Result<LiquidationSession, RetriesExhausted> {
        let balance = self
            .retry
            .run("fetch_balance", || self.venue.fetch_balance())
            .await?;

        let free = balance.free(session.symbol().base());
        Ok(session.with_remaining(free))
    }
}

fn fmt_average(result: &OrderResult) -> String {
    result
        .average
        .map(|p| p.to_string())
        .unwrap_or_else(|| "n/a".to_string())
}
