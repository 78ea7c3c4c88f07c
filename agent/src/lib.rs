//! Liquidator Agent - configuration, logging, and process wiring

pub mod app;
pub mod config;
pub mod logging;

pub use app::run;
pub use config::{AgentConfig, ConfigError};
