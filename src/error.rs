//! Error types for the resolver daemon.

use thiserror::Error;

/// Failure reported by a container inventory source.
#[derive(Debug, Error)]
pub enum InventoryError {
    /// The Docker engine could not be reached or rejected the request.
    #[error("docker error: {0}")]
    Docker(#[from] bollard::errors::Error),

    /// Any other inventory backend failure.
    #[error("{0}")]
    Other(String),
}

/// Errors surfaced by the daemon's components.
#[derive(Debug, Error)]
pub enum Error {
    /// Listing containers failed.
    #[error("inventory query failed: {0}")]
    Inventory(#[from] InventoryError),

    /// IO error (socket bind, listener shutdown).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// DNS protocol error (bad service zone name).
    #[error("DNS protocol error: {0}")]
    Proto(#[from] hickory_server::proto::error::ProtoError),
}

pub type Result<T> = std::result::Result<T, Error>;
