//! Inventory poller.
//!
//! Every tick the poller lists labelled containers, rebuilds the whole
//! resolution table from that snapshot and publishes it.  Nothing is merged
//! with the previous cycle, so stopped containers disappear on the next
//! tick without explicit removal.

use std::net::Ipv4Addr;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::config::{Config, InventoryErrorPolicy};
use crate::error::Result;
use crate::inventory::ContainerInventory;
use crate::table::{normalize, Records, ResolutionTable};
use crate::types::ContainerSnapshot;

/// Compute the hostname → addresses table for one inventory snapshot.
///
/// Every container carrying `label` creates its hostname key.  Only
/// containers attached to exactly one network contribute an address.
pub fn build_records(containers: &[ContainerSnapshot], label: &str) -> Records {
    let mut records = Records::new();

    for container in containers {
        let Some(value) = container.label(label) else {
            continue;
        };
        let addresses = records.entry(normalize(&format!("{}.", value))).or_default();

        let [attachment] = container.networks.as_slice() else {
            debug!(
                "Skipping address of {} ({}): {} networks attached",
                container.id,
                value,
                container.networks.len()
            );
            continue;
        };

        match attachment.ip_address.parse::<Ipv4Addr>() {
            Ok(ip) => addresses.push(ip),
            Err(_) => debug!(
                "Skipping address of {} ({}): no IPv4 address on {}",
                container.id, value, attachment.network
            ),
        }
    }

    records
}

pub struct InventoryPoller<I> {
    inventory: I,
    table: ResolutionTable,
    label: String,
    interval: Duration,
    policy: InventoryErrorPolicy,
}

impl<I: ContainerInventory> InventoryPoller<I> {
    pub fn new(
        inventory: I,
        table: ResolutionTable,
        label: impl Into<String>,
        interval: Duration,
        policy: InventoryErrorPolicy,
    ) -> Self {
        Self {
            inventory,
            table,
            label: label.into(),
            interval,
            policy,
        }
    }

    pub fn from_config(inventory: I, table: ResolutionTable, cfg: &Config) -> Self {
        Self::new(
            inventory,
            table,
            cfg.label.clone(),
            cfg.poll_interval(),
            cfg.on_inventory_error,
        )
    }

    /// Run one poll cycle and publish the result.  Returns the number of
    /// hostnames in the new table.
    pub async fn poll_once(&self) -> Result<usize> {
        let containers = self.inventory.list_containers(&self.label).await?;
        let records = build_records(&containers, &self.label);
        let names = records.len();
        debug!(
            "Poll found {} containers, {} hostnames",
            containers.len(),
            names
        );
        self.table.replace(records).await;
        Ok(names)
    }

    /// Poll until `shutdown` turns true or its sender is dropped.
    ///
    /// With [`InventoryErrorPolicy::Exit`] the first failed inventory query
    /// ends the loop with that error.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            "Polling containers labelled {} every {:?}",
            self.label, self.interval
        );
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut failures: u32 = 0;

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            // A stuck inventory call must not hold up shutdown.
            let polled = tokio::select! {
                polled = self.poll_once() => polled,
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown requested while polling, abandoning poll");
                        break;
                    }
                    continue;
                }
            };

            match polled {
                Ok(_) => {
                    if failures > 0 {
                        info!("Inventory recovered after {} failed polls", failures);
                    }
                    failures = 0;
                }
                Err(e) => match self.policy {
                    InventoryErrorPolicy::Exit => {
                        error!("Failed to list containers: {}", e);
                        return Err(e);
                    }
                    InventoryErrorPolicy::KeepLastKnown => {
                        failures += 1;
                        let current = self.table.snapshot().await;
                        warn!(
                            "Failed to list containers ({} in a row): {}. Serving table generation {} published {:?} ago",
                            failures,
                            e,
                            current.generation(),
                            current.age()
                        );
                    }
                },
            }
        }

        info!("Inventory poller stopped");
        Ok(())
    }
}
