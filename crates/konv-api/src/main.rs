//! konvbot entry point
//!
//! Configuration is read from the environment (and `.env` if present).

use anyhow::Context;
use konv_common::{try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = ?e, "konvbot failed");
        eprintln!("konvbot failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("failed to load configuration")?;

    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_settings(&config.app)) {
        eprintln!("Warning: {e}");
    }

    info!(
        env = ?config.app.env,
        port = config.api.port,
        store = ?config.store,
        "Configuration loaded"
    );

    konv_api::run(config).await?;
    Ok(())
}
