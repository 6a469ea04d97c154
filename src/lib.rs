//! DNS service discovery for containers.
//!
//! Containers carrying a discovery label (default `dnsresolve`) resolve
//! under the label's value.  A background [`InventoryPoller`] rebuilds the
//! [`ResolutionTable`] from the container engine every poll interval, and
//! the DNS server answers `A` queries from that table through the
//! [`QueryResolver`].
//!
//! ```text
//!  Docker ──list──▶ InventoryPoller ──replace──▶ ResolutionTable
//!                                                      ▲
//!  UDP/TCP :53 ──▶ dns_server ──▶ QueryResolver ──lookup┘
//! ```

pub mod config;
pub mod dns_server;
pub mod error;
pub mod inventory;
pub mod poller;
pub mod resolver;
pub mod table;
pub mod types;

pub use config::{Config, InventoryErrorPolicy};
pub use error::{Error, InventoryError};
pub use inventory::{ContainerInventory, DockerInventory};
pub use poller::InventoryPoller;
pub use resolver::QueryResolver;
pub use table::ResolutionTable;
pub use types::{ContainerSnapshot, NetworkAttachment};
