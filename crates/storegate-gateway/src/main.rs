//! sg-gateway: the StoreGate gateway server binary
//!
//! Loads the JSON configuration, exports the configured shares, brings the
//! passthru authentication pool online, and runs until interrupted.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use storegate_auth::connector::TcpSessionConnector;
use storegate_auth::passthru::PassthruServerPool;
use storegate_gateway::config::StoreGateConfig;
use storegate_gateway::session::StoreGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("storegate.json"));
    if !config_path.exists() {
        anyhow::bail!("configuration file not found: {}", config_path.display());
    }

    info!(path = %config_path.display(), "StoreGate gateway starting");
    let config = StoreGateConfig::from_file(&config_path)?;

    let mut gateway = StoreGateway::from_config(&config)?;
    let pool = PassthruServerPool::start(
        config.passthru.clone(),
        Arc::new(TcpSessionConnector::new()),
    )?;
    info!(
        servers = pool.total_count(),
        "passthru authentication pool online"
    );
    gateway.set_passthru_pool(Arc::new(pool));

    info!(shares = config.shares.len(), "StoreGate gateway ready");

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    gateway.shutdown();
    Ok(())
}
