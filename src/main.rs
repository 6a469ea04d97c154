//! dnsresolve daemon entry point.

use log::{error, info};
use tokio::signal;
use tokio::sync::watch;

use dnsresolve::dns_server::run_dns_server;
use dnsresolve::{Config, DockerInventory, InventoryPoller, QueryResolver, ResolutionTable};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    env_logger::init();

    // Load configuration
    let cfg = Config::load()?;
    info!(
        "Starting at {}, label {}, service {}",
        cfg.dns_bind(),
        cfg.label,
        cfg.service
    );

    // Shared state
    let table = ResolutionTable::new();

    // Inventory poller (Docker)
    let inventory = DockerInventory::connect()
        .map_err(|e| anyhow::anyhow!("Failed to connect to docker: {}", e))?;
    let poller = InventoryPoller::from_config(inventory, table.clone(), &cfg);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let mut poller_handle = tokio::spawn(poller.run(shutdown_rx));

    // DNS server
    let resolver = QueryResolver::new(table, cfg.service_zone()?);
    let dns_bind = cfg.dns_bind();
    let mut dns_handle = tokio::spawn(run_dns_server(dns_bind, resolver));

    let outcome = tokio::select! {
        res = signal::ctrl_c() => {
            match res {
                Ok(()) => info!("Received Ctrl+C, shutting down..."),
                Err(err) => error!("Unable to listen for shutdown signal: {}", err),
            }
            Ok(())
        }
        res = &mut poller_handle => match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!("Inventory poller failed: {}", e)),
            Err(e) => Err(anyhow::anyhow!("Inventory poller panicked: {}", e)),
        },
        res = &mut dns_handle => match res {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow::anyhow!("DNS server failed: {}", e)),
            Err(e) => Err(anyhow::anyhow!("DNS server panicked: {}", e)),
        },
    };

    // Stop the poller cleanly, abort the server
    let _ = shutdown_tx.send(true);
    dns_handle.abort();
    if !poller_handle.is_finished() {
        let _ = poller_handle.await;
    }

    if outcome.is_ok() {
        info!("Shutdown complete.");
    }
    outcome
}
