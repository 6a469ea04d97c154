use async_trait::async_trait;

use crate::error::InventoryError;
use crate::types::ContainerSnapshot;

pub mod docker;
pub use docker::DockerInventory;

#[async_trait]
pub trait ContainerInventory: Send + Sync {
    /// List running containers that carry the `label` key, whatever its value.
    async fn list_containers(&self, label: &str)
        -> Result<Vec<ContainerSnapshot>, InventoryError>;
}
