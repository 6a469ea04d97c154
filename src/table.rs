//! The resolution table shared by the poller and the DNS handlers.
//!
//! Each poll cycle builds a complete [`Records`] map and publishes it with
//! [`ResolutionTable::replace`].  Published maps are never mutated: the
//! lock only guards the pointer to the current map, so readers clone an
//! `Arc` and release the lock before touching any entry.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::debug;
use tokio::sync::RwLock;

/// Hostname (lower-case, trailing dot) to addresses, in inventory order.
pub type Records = HashMap<String, Vec<Ipv4Addr>>;

/// One published table.
#[derive(Debug)]
pub struct Snapshot {
    records: Records,
    generation: u64,
    published_at: Instant,
}

impl Snapshot {
    pub fn records(&self) -> &Records {
        &self.records
    }

    /// Number of `replace` calls that preceded this snapshot.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn age(&self) -> Duration {
        self.published_at.elapsed()
    }

    pub fn lookup(&self, hostname: &str) -> &[Ipv4Addr] {
        self.records
            .get(&normalize(hostname))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// Cloneable handle to the current hostname → addresses table.
#[derive(Debug, Clone)]
pub struct ResolutionTable {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl Default for ResolutionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(Snapshot {
                records: Records::new(),
                generation: 0,
                published_at: Instant::now(),
            }))),
        }
    }

    /// Install `records` as the current table, discarding the previous one.
    ///
    /// Keys differing only in case are merged into one entry.
    pub async fn replace(&self, records: Records) {
        let mut merged = Records::with_capacity(records.len());
        for (name, ips) in records {
            merged.entry(normalize(&name)).or_default().extend(ips);
        }
        let mut current = self.current.write().await;
        let next = Snapshot {
            records: merged,
            generation: current.generation + 1,
            published_at: Instant::now(),
        };
        debug!(
            "Publishing table generation {} with {} names",
            next.generation,
            next.records.len()
        );
        *current = Arc::new(next);
    }

    /// The table as of the most recent completed `replace`.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&*self.current.read().await)
    }

    /// Addresses for `hostname`, empty when the name is unknown.
    pub async fn lookup(&self, hostname: &str) -> Vec<Ipv4Addr> {
        self.snapshot().await.lookup(hostname).to_vec()
    }

    pub async fn contains(&self, hostname: &str) -> bool {
        self.snapshot()
            .await
            .records
            .contains_key(&normalize(hostname))
    }

    pub async fn len(&self) -> usize {
        self.snapshot().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn generation(&self) -> u64 {
        self.snapshot().await.generation
    }
}

/// DNS names compare case-insensitively; keys are stored lower-case.
pub(crate) fn normalize(hostname: &str) -> String {
    hostname.to_ascii_lowercase()
}
