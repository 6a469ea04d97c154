//! Data structures shared between the inventory and the poller.
//!
//! A [`ContainerSnapshot`] is the inventory's view of one running
//! container at the moment it was listed.  Snapshots are ephemeral: the
//! poller consumes a fresh batch every cycle and drops it once the
//! resolution table has been rebuilt.

use std::collections::HashMap;

/// One container as reported by the inventory for a single poll cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerSnapshot {
    /// Container id, used for diagnostics only.
    pub id: String,
    /// All labels on the container.  The value of the discovery label is
    /// the hostname the container resolves under.
    pub labels: HashMap<String, String>,
    /// Network attachments in the order the inventory reported them.
    pub networks: Vec<NetworkAttachment>,
}

/// A container's endpoint on one network.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkAttachment {
    /// Network name as known to the container engine.
    pub network: String,
    /// Address on that network.  Docker reports an empty string for
    /// endpoints that have no IPv4 address.
    pub ip_address: String,
}

impl ContainerSnapshot {
    /// Value of `label`, if the container carries it.
    pub fn label(&self, label: &str) -> Option<&str> {
        self.labels.get(label).map(String::as_str)
    }
}
