//! Leadgate lead relay service.
//!
//! Main entry point: initializes tracing, loads configuration, builds
//! the delivery pipeline, and serves the HTTP surface until shutdown.

use anyhow::{Context, Result};
use leadgate_api::{AppState, Config};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Starting leadgate lead relay service");

    let config = Config::load()?;
    let addr = config.parse_server_addr()?;

    let missing = config.missing_required();
    if !missing.is_empty() {
        warn!(
            missing = ?missing,
            "Required configuration values are not set; deliveries will fail until provided"
        );
    }

    let state = AppState::from_config(config).context("Failed to build delivery pipeline")?;

    info!(addr = %addr, "Leadgate is ready to receive submissions");

    leadgate_api::start_server(state, addr).await.context("Server failed")?;

    info!("Leadgate shutdown complete");
    Ok(())
}

/// Initializes tracing with environment-based configuration.
fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,leadgate=debug,tower_http=debug"))
        .expect("Invalid RUST_LOG environment variable");

    let fmt_layer = fmt::layer().with_target(true).with_file(true).with_line_number(true);

    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}
