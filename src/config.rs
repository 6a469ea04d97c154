use figment::{
    providers::{Env, Format, Json, Serialized, Toml},
    Figment,
};
use hickory_server::proto::rr::Name;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::error::{Error, Result};

/// What the poller does when the inventory cannot be listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum InventoryErrorPolicy {
    /// Stop the poller and exit the daemon.
    Exit,
    /// Keep answering from the last published table and retry next tick.
    KeepLastKnown,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind_ip: Option<IpAddr>,
    /// Container label whose value is the published hostname.
    pub label: String,
    /// Zone the server answers for; queries outside it are refused.
    pub service: String,
    pub poll_interval_ms: u64,
    pub on_inventory_error: InventoryErrorPolicy,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 53,
            bind_ip: None,
            label: "dnsresolve".into(),
            service: "service".into(),
            poll_interval_ms: 1000,
            on_inventory_error: InventoryErrorPolicy::Exit,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file("dnsresolve.toml"))
                .merge(Json::file("dnsresolve.json"))
                .merge(Env::prefixed("DNSRESOLVE_")),
        )
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment
            .extract()
            .map_err(|e| Error::Config(format!("failed to load configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.label.trim().is_empty() {
            return Err(Error::Config("label must not be empty".into()));
        }
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".into()));
        }
        self.service_zone()?;
        Ok(())
    }

    pub fn dns_bind(&self) -> SocketAddr {
        let ip = self.bind_ip.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        SocketAddr::new(ip, self.port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Fully qualified zone built from `service`, e.g. `service.`.
    pub fn service_zone(&self) -> Result<Name> {
        let mut zone = Name::from_ascii(self.service.trim_end_matches('.'))?;
        zone.set_fqdn(true);
        Ok(zone)
    }
}
