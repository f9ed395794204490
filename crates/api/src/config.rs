//! Process configuration for the `catalog-api` binary.

use std::net::SocketAddr;

use catalog_infra::{ConfigError, StoreConfig};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub store: StoreConfig,
}

impl ApiConfig {
    /// Reads `CATALOG_BIND_ADDR` plus everything `StoreConfig::from_env` reads.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = lookup("CATALOG_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = raw.trim().parse::<SocketAddr>().map_err(|e| {
            ConfigError::Invalid {
                key: "CATALOG_BIND_ADDR",
                value: raw.clone(),
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            bind_addr,
            store: StoreConfig::from_lookup(lookup)?,
        })
    }
}
