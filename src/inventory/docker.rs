use super::ContainerInventory;
use crate::error::InventoryError;
use crate::types::{ContainerSnapshot, NetworkAttachment};
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use bollard::Docker;
use log::{debug, info};
use std::collections::HashMap;

/// Container inventory backed by the local Docker engine.
pub struct DockerInventory {
    docker: Docker,
}

impl DockerInventory {
    pub fn new(docker: Docker) -> Self {
        Self { docker }
    }

    /// Connect to the local Docker daemon using default settings.
    /// This handles the unix socket on Linux and honours `DOCKER_HOST`.
    pub fn connect() -> Result<Self, InventoryError> {
        let docker = Docker::connect_with_local_defaults()?;
        info!("Using local Docker engine");
        Ok(Self::new(docker))
    }
}

#[async_trait]
impl ContainerInventory for DockerInventory {
    async fn list_containers(
        &self,
        label: &str,
    ) -> Result<Vec<ContainerSnapshot>, InventoryError> {
        let opts = ListContainersOptions::<String> {
            all: false,
            filters: HashMap::from([("label".to_string(), vec![label.to_string()])]),
            ..Default::default()
        };
        let containers = self.docker.list_containers(Some(opts)).await?;
        debug!("Docker reported {} containers labelled {}", containers.len(), label);

        Ok(containers.into_iter().map(snapshot_from_summary).collect())
    }
}

fn snapshot_from_summary(summary: ContainerSummary) -> ContainerSnapshot {
    let mut networks: Vec<NetworkAttachment> = summary
        .network_settings
        .and_then(|s| s.networks)
        .unwrap_or_default()
        .into_iter()
        .map(|(name, endpoint)| NetworkAttachment {
            network: name,
            ip_address: endpoint.ip_address.unwrap_or_default(),
        })
        .collect();
    // Docker hands networks back as a map; keep the order stable.
    networks.sort_by(|a, b| a.network.cmp(&b.network));

    ContainerSnapshot {
        id: summary.id.unwrap_or_default(),
        labels: summary.labels.unwrap_or_default(),
        networks,
    }
}
