//! podsync TCP server.

use anyhow::Context;
use podsync_server::{Config, Server};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().context("reading PODSYNC_* environment")?;

    info!(
        addr = %config.socket_addr_string(),
        max_clients = config.max_clients,
        "starting podsync-server"
    );

    let server = Server::bind(config).await?;

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "could not listen for ctrl-c");
                return;
            }
            info!("ctrl-c received");
            shutdown.cancel();
        });
    }

    server.run(shutdown).await
}
