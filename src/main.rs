//! wnt-realtime entry point.
//!
//! Runs one realtime situation session and exits with its result code.

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use wnt_gateway::config::{SessionConfig, log_level};
use wnt_gateway::service::run_session;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level())),
        )
        .try_init()
        .map_err(anyhow::Error::msg)
        .context("installing tracing subscriber")?;

    // Load configuration
    let config = match SessionConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, code = e.error_code(), "cannot load session configuration");
            std::process::exit(-1);
        }
    };

    tracing::info!(
        auth = %config.authentication_url(),
        realtime_situation = %config.realtime_situation_url(),
        "starting realtime situation session"
    );

    let code = run_session(&config).await;
    std::process::exit(code);
}
