use liquidator_agent::{logging, AgentConfig};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match AgentConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_tracing(&config.logging);

    match liquidator_agent::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("liquidator stopped: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
