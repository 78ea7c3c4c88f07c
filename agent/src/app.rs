//! Process wiring: venue selection and the monitor lifecycle

use crate::config::AgentConfig;
use anyhow::{Context, Result};
use liquidator_core::Venue;
use liquidator_engine::{BalanceMonitor, RetryExecutor};
use liquidator_networking::{OkxClient, PaperVenue};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

/// The venue the agent trades against
pub enum AgentVenue {
    Live(Arc<OkxClient>),
    /// Simulated account on top of live OKX market data
    Paper(Arc<PaperVenue<OkxClient>>),
}

impl AgentVenue {
    pub fn as_venue(&self) -> Arc<dyn Venue> {
        match self {
            AgentVenue::Live(okx) => okx.clone() as Arc<dyn Venue>,
            AgentVenue::Paper(paper) => paper.clone() as Arc<dyn Venue>,
        }
    }
}

/// Build the venue selected by the configuration
pub fn build_venue(config: &AgentConfig) -> Result<AgentVenue> {
    let okx = OkxClient::new(config.venue.clone()).context("failed to build OKX client")?;

    if !config.paper.enabled {
        if config.venue.simulated {
            info!("Using OKX demo trading");
        }
        return Ok(AgentVenue::Live(Arc::new(okx)));
    }

    let asset = config.liquidation.symbol.base();
    warn!(
        "Paper mode: orders are simulated, starting with {} {}",
        config.paper.starting_balance, asset
    );
    let paper = PaperVenue::new(Arc::new(okx)).with_balance(asset, config.paper.starting_balance);
    Ok(AgentVenue::Paper(Arc::new(paper)))
}

/// Credit `amount` of `asset` to the paper account every `interval`
pub async fn simulate_deposits(
    paper: Arc<PaperVenue<OkxClient>>,
    asset: String,
    amount: f64,
    interval: Duration,
) {
    loop {
        tokio::time::sleep(interval).await;

        if let Err(e) = paper.credit(&asset, amount) {
            warn!("Stopping simulated deposits: {}", e);
            return;
        }
        info!("Paper deposit: {} {}", amount, asset);
    }
}

/// Run the balance monitor until it fails or the process is interrupted
pub async fn run(config: AgentConfig) -> Result<()> {
    let venue = build_venue(&config)?;

    if let AgentVenue::Paper(paper) = &venue {
        if config.paper.deposit_amount > 0.0 {
            tokio::spawn(simulate_deposits(
                paper.clone(),
                config.liquidation.symbol.base().to_string(),
                config.paper.deposit_amount,
                config.paper.deposit_interval(),
            ));
        }
    }

    let monitor = BalanceMonitor::new(
        venue.as_venue(),
        RetryExecutor::new(config.retry.clone()),
        config.liquidation.clone(),
        config.polling.clone(),
    );

    tokio::select! {
        err = monitor.run() => {
            error!("{}", err);
            Err(err.into())
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for shutdown signal")?;
            info!("Shutdown requested, stopping balance monitor");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use liquidator_networking::OkxConfig;

    fn paper_config() -> AgentConfig {
        let mut config = AgentConfig::default();
        config.paper.enabled = true;
        config.paper.starting_balance = 8.0;
        config
    }

    #[tokio::test]
    async fn test_paper_mode_seeds_watched_asset() {
        let venue = build_venue(&paper_config()).unwrap().as_venue();
        assert_eq!(venue.name(), "paper");

        let balance = venue.fetch_balance().await.unwrap();
        assert_eq!(balance.free("GRASS").as_f64(), 8.0);
    }

    #[test]
    fn test_live_mode_uses_okx() {
        let mut config = AgentConfig::default();
        config.venue.api_key = "k".to_string();
        config.venue.secret_key = "s".to_string();
        config.venue.passphrase = "p".to_string();

        let venue = build_venue(&config).unwrap();
        assert!(matches!(venue, AgentVenue::Live(_)));
        assert_eq!(venue.as_venue().name(), "okx");
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulated_deposits_accumulate() {
        let okx = OkxClient::new(OkxConfig::default()).unwrap();
        let paper = Arc::new(PaperVenue::new(Arc::new(okx)));

        let task = tokio::spawn(simulate_deposits(
            paper.clone(),
            "GRASS".to_string(),
            2.5,
            Duration::from_secs(60),
        ));

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(paper.fetch_balance().await.unwrap().free("GRASS").as_f64(), 0.0);

        tokio::time::sleep(Duration::from_secs(91)).await;
        assert_eq!(paper.fetch_balance().await.unwrap().free("GRASS").as_f64(), 5.0);

        task.abort();
    }
}
