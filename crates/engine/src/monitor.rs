//! Balance monitor: the outer polling loop
//!
//! Polls the free balance of the watched asset and hands off to the
//! [`LiquidationEngine`] once it reaches the entry threshold. Sessions run
//! inline, so the monitor is blocked until the engine returns and two
//! sessions can never overlap.
//!
//! Failures here are fatal. Engine failures end a session; a monitor that
//! cannot see the balance stops and reports [`MonitorError::Fatal`].

use crate::liquidation::{LiquidationEngine, SessionReport};
use crate::retry::{RetriesExhausted, RetryExecutor};
use crate::session::{LiquidationConfig, LiquidationSession};
use liquidator_core::{Quantity, Venue};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Loop cadences
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollingConfig {
    /// Pause between monitor iterations
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
    /// Pause between order placements inside a session
    #[serde(default = "default_order_interval_ms")]
    pub order_interval_ms: u64,
}

fn default_monitor_interval_ms() -> u64 { 500 }
fn default_order_interval_ms() -> u64 { 250 }

impl PollingConfig {
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn order_interval(&self) -> Duration {
        Duration::from_millis(self.order_interval_ms)
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            monitor_interval_ms: default_monitor_interval_ms(),
            order_interval_ms: default_order_interval_ms(),
        }
    }
}

/// What a single monitor iteration did
#[derive(Debug)]
pub enum TickOutcome {
    /// Balance below the entry threshold
    Waiting { free: Quantity },
    /// Balance high enough, but the venue reported no last price
    PriceUnavailable { free: Quantity },
    /// A session ran to completion
    Session(SessionReport),
}

/// Unrecoverable monitor failure
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("balance monitor stopped: {0}")]
    Fatal(#[from] RetriesExhausted),
}

/// Watches one asset and liquidates it when it shows up
pub struct BalanceMonitor<V: ?Sized> {
    venue: Arc<V>,
    retry: RetryExecutor,
    config: LiquidationConfig,
    polling: PollingConfig,
    engine: LiquidationEngine<V>,
}

impl<V: Venue + ?Sized> BalanceMonitor<V> {
    pub fn new(
        venue: Arc<V>,
        retry: RetryExecutor,
        config: LiquidationConfig,
        polling: PollingConfig,
    ) -> Self {
        let engine = LiquidationEngine::new(venue.clone(), retry.clone(), polling.order_interval());
        Self {
            venue,
            retry,
            config,
            polling,
            engine,
        }
    }

    /// Poll until a venue read fails on every retry. Only returns with that error.
    pub async fn run(&self) -> MonitorError {
        info!(
            "Starting {} balance monitoring on {}...",
            self.config.symbol.base(),
            self.venue.name()
        );

        loop {
            if let Err(e) = self.tick().await {
                return e;
            }
            tokio::time::sleep(self.polling.monitor_interval()).await;
        }
    }

    /// One monitor iteration
    pub async fn tick(&self) -> Result<TickOutcome, MonitorError> {
        let asset = self.config.symbol.base();

        let balance = self
            .retry
            .run("fetch_balance", || self.venue.fetch_balance())
            .await?;
        let free = balance.free(asset);

        if free < self.config.entry_threshold() {
            info!("{} balance: {}. Waiting for tokens to arrive...", asset, free);
            return Ok(TickOutcome::Waiting { free });
        }

        let ticker = self
            .retry
            .run("fetch_ticker", || self.venue.fetch_ticker(&self.config.symbol))
            .await?;

        let Some(last) = ticker.last else {
            info!(
                "Could not get the current price for {}. Waiting...",
                self.config.symbol
            );
            return Ok(TickOutcome::PriceUnavailable { free });
        };

        let session = LiquidationSession::open(&self.config, free, last);
        Ok(TickOutcome::Session(self.engine.run(session).await))
    }
}
