//! Liquidator Engine - Retry policy, balance monitoring, and the liquidation state machine

pub mod liquidation;
pub mod monitor;
pub mod retry;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use liquidation::{classify, LiquidationEngine, OrderTransition, SessionOutcome, SessionReport};
pub use monitor::{BalanceMonitor, MonitorError, PollingConfig, TickOutcome};
pub use retry::{RetriesExhausted, RetryExecutor, RetryPolicy};
pub use session::{LiquidationConfig, LiquidationSession};
