//! Agent configuration
//!
//! Sources, later ones overriding earlier ones:
//! 1. `config/default.toml` (optional)
//! 2. the file named by `LIQUIDATOR_CONFIG` (required when set)
//! 3. environment variables, e.g. `LIQUIDATOR_RETRY__MAX_ATTEMPTS=5`
//!
//! Everything is read once at startup.

use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use liquidator_engine::{LiquidationConfig, PollingConfig, RetryPolicy};
use liquidator_networking::OkxConfig;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Configuration loading or validation failure
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub venue: OkxConfig,
    #[serde(default)]
    pub liquidation: LiquidationConfig,
    #[serde(default)]
    pub retry: RetryPolicy,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub paper: PaperConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Dry-run mode: simulated account, real market data
#[derive(Debug, Clone, Deserialize)]
pub struct PaperConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Free balance of the watched asset the simulated account starts with
    #[serde(default)]
    pub starting_balance: f64,
    /// Simulated deposit credited every `deposit_interval_secs`; zero disables it
    #[serde(default)]
    pub deposit_amount: f64,
    #[serde(default = "default_deposit_interval_secs")]
    pub deposit_interval_secs: u64,
}

fn default_deposit_interval_secs() -> u64 { 60 }

impl Default for PaperConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            starting_balance: 0.0,
            deposit_amount: 0.0,
            deposit_interval_secs: default_deposit_interval_secs(),
        }
    }
}

impl PaperConfig {
    pub fn deposit_interval(&self) -> Duration {
        Duration::from_secs(self.deposit_interval_secs)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
    /// Filter directive used when `RUST_LOG` is not set
    #[serde(default)]
    pub filter: Option<String>,
}

/// `LIQUIDATOR_*` variables, `__` between nested keys. Values stay strings
/// until deserialization so credentials like `007123` keep their exact text.
fn environment() -> Environment {
    Environment::with_prefix("LIQUIDATOR")
        .prefix_separator("_")
        .separator("__")
}

impl AgentConfig {
    /// Load from the default locations and the environment, then validate
    pub fn load() -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .add_source(File::with_name("config/default").required(false));

        if let Ok(path) = std::env::var("LIQUIDATOR_CONFIG") {
            builder = builder.add_source(File::with_name(&path).required(true));
        }

        builder = builder.add_source(environment());

        let config = Self::from_builder(builder)?;
        config.validate()?;
        Ok(config)
    }

    /// Deserialize whatever sources the builder holds
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        Ok(builder.build()?.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.liquidation
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".to_string()));
        }

        if self.venue.size_decimals > 12 {
            return Err(ConfigError::Invalid(format!(
                "venue.size_decimals {} is out of range",
                self.venue.size_decimals
            )));
        }

        if !self.paper.enabled && !self.venue.has_credentials() {
            return Err(ConfigError::Invalid(
                "venue.api_key, venue.secret_key and venue.passphrase are required unless paper.enabled"
                    .to_string(),
            ));
        }

        if self.paper.starting_balance < 0.0 || self.paper.deposit_amount < 0.0 {
            return Err(ConfigError::Invalid(
                "paper.starting_balance and paper.deposit_amount cannot be negative".to_string(),
            ));
        }

        if self.paper.deposit_amount > 0.0 && self.paper.deposit_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "paper.deposit_interval_secs must be positive when deposits are enabled".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> AgentConfig {
        AgentConfig::from_builder(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
            .unwrap()
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse("");
        assert_eq!(config.liquidation.symbol.to_string(), "GRASS/USDT");
        assert_eq!(config.liquidation.entry_threshold, 3.0);
        assert_eq!(config.liquidation.execution_threshold, 5.0);
        assert_eq!(config.retry.max_attempts, 15);
        assert_eq!(config.retry.delay(), Duration::from_secs(10));
        assert_eq!(config.polling.monitor_interval(), Duration::from_millis(500));
        assert_eq!(config.polling.order_interval(), Duration::from_millis(250));
        assert_eq!(config.venue.base_url, "https://www.okx.com");
        assert!(!config.paper.enabled);
    }

    #[test]
    fn test_overrides() {
        let config = parse(
            r#"
            [venue]
            api_key = "k"
            secret_key = "s"
            passphrase = "p"
            simulated = true

            [liquidation]
            symbol = "ABC/USDC"
            entry_threshold = 10
            execution_threshold = 20.5

            [retry]
            max_attempts = 4
            delay_ms = 250
            "#,
        );

        assert_eq!(config.liquidation.symbol.base(), "ABC");
        assert_eq!(config.liquidation.symbol.quote(), "USDC");
        assert_eq!(config.liquidation.entry_threshold, 10.0);
        assert_eq!(config.liquidation.execution_threshold, 20.5);
        assert_eq!(config.retry.max_attempts, 4);
        assert!(config.venue.simulated);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_symbol_fails_to_load() {
        let result = AgentConfig::from_builder(Config::builder().add_source(File::from_str(
            "[liquidation]\nsymbol = \"GRASSUSDT\"",
            FileFormat::Toml,
        )));
        assert!(result.is_err());
    }

    #[test]
    fn test_credentials_required_outside_paper_mode() {
        let config = parse("");
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = parse("[paper]\nenabled = true\nstarting_balance = 12");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_values_keep_their_text() {
        let vars = config::Map::from([
            ("LIQUIDATOR_VENUE__API_KEY".to_string(), "1e3".to_string()),
            ("LIQUIDATOR_VENUE__SECRET_KEY".to_string(), "0042".to_string()),
            ("LIQUIDATOR_VENUE__PASSPHRASE".to_string(), "007123".to_string()),
            ("LIQUIDATOR_RETRY__MAX_ATTEMPTS".to_string(), "4".to_string()),
            ("LIQUIDATOR_PAPER__ENABLED".to_string(), "true".to_string()),
            ("LIQUIDATOR_LIQUIDATION__EXECUTION_THRESHOLD".to_string(), "7.5".to_string()),
        ]);

        let config =
            AgentConfig::from_builder(Config::builder().add_source(environment().source(Some(vars))))
                .unwrap();

        assert_eq!(config.venue.api_key, "1e3");
        assert_eq!(config.venue.secret_key, "0042");
        assert_eq!(config.venue.passphrase, "007123");
        assert_eq!(config.retry.max_attempts, 4);
        assert!(config.paper.enabled);
        assert_eq!(config.liquidation.execution_threshold, 7.5);
    }

    #[test]
    fn test_paper_deposits() {
        let config = parse("[paper]\nenabled = true\ndeposit_amount = 6\ndeposit_interval_secs = 30");
        assert_eq!(config.paper.deposit_amount, 6.0);
        assert_eq!(config.paper.deposit_interval(), Duration::from_secs(30));
        assert!(config.validate().is_ok());

        let config = parse("[paper]\nenabled = true\ndeposit_amount = 6\ndeposit_interval_secs = 0");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let config = parse("[paper]\nenabled = true\n[retry]\nmax_attempts = 0");
        assert!(config.validate().is_err());
    }
}
