//! Store configuration, read from the environment once at bootstrap.

use thiserror::Error;

pub const DEFAULT_PRODUCTS_TABLE: &str = "products";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    InMemory,
    Postgres { database_url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub products_table: String,
    pub max_connections: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            backend: StoreBackend::InMemory,
            products_table: DEFAULT_PRODUCTS_TABLE.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }

    /// Reads `USE_PERSISTENT_STORES`, `DATABASE_URL`, `CATALOG_PRODUCTS_TABLE`
    /// and `CATALOG_DB_MAX_CONNECTIONS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let use_persistent = match lookup("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => raw.trim().parse::<bool>().map_err(|e| ConfigError::Invalid {
                key: "USE_PERSISTENT_STORES",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
        };

        let backend = if use_persistent {
            let database_url = lookup("DATABASE_URL")
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            StoreBackend::Postgres { database_url }
        } else {
            StoreBackend::InMemory
        };

        let products_table = match lookup("CATALOG_PRODUCTS_TABLE") {
            None => DEFAULT_PRODUCTS_TABLE.to_string(),
            Some(raw) => {
                validate_table_name(&raw).map_err(|reason| ConfigError::Invalid {
                    key: "CATALOG_PRODUCTS_TABLE",
                    value: raw.clone(),
                    reason,
                })?;
                raw
            }
        };

        let max_connections = match lookup("CATALOG_DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(raw) => match raw.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(ConfigError::Invalid {
                        key: "CATALOG_DB_MAX_CONNECTIONS",
                        value: raw,
                        reason: "must be at least 1".to_string(),
                    });
                }
                Err(e) => {
                    return Err(ConfigError::Invalid {
                        key: "CATALOG_DB_MAX_CONNECTIONS",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
        };

        Ok(Self {
            backend,
            products_table,
            max_connections,
        })
    }
}

/// Table names are interpolated into SQL, so only plain identifiers are accepted.
pub fn validate_table_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("table name cannot be empty".to_string()),
        Some(c) if !(c.is_ascii_lowercase() || c == '_') => {
            return Err("table name must start with a lowercase letter or '_'".to_string());
        }
        Some(_) => {}
    }
    if name.len() > 63 {
        return Err("table name longer than 63 bytes".to_string());
    }
    if !chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_') {
        return Err("table name may only contain [a-z0-9_]".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_in_memory() {
        let cfg = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, StoreConfig::in_memory());
    }

    #[test]
    fn persistent_requires_database_url() {
        let err =
            StoreConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DATABASE_URL"));

        let cfg = StoreConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/catalog"),
            ("CATALOG_PRODUCTS_TABLE", "catalog_products"),
            ("CATALOG_DB_MAX_CONNECTIONS", "12"),
        ]))
        .unwrap();
        assert_eq!(
            cfg.backend,
            StoreBackend::Postgres {
                database_url: "postgres://localhost/catalog".to_string()
            }
        );
        assert_eq!(cfg.products_table, "catalog_products");
        assert_eq!(cfg.max_connections, 12);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "maybe")])),
            Err(ConfigError::Invalid { key: "USE_PERSISTENT_STORES", .. })
        ));
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[("CATALOG_DB_MAX_CONNECTIONS", "0")])),
            Err(ConfigError::Invalid { key: "CATALOG_DB_MAX_CONNECTIONS", .. })
        ));
        assert!(matches!(
            StoreConfig::from_lookup(lookup(&[(
                "CATALOG_PRODUCTS_TABLE",
                "products; drop table x"
            )])),
            Err(ConfigError::Invalid { key: "CATALOG_PRODUCTS_TABLE", .. })
        ));
    }

    #[test]
    fn table_name_rules() {
        assert!(validate_table_name("products").is_ok());
        assert!(validate_table_name("_p2").is_ok());
        assert!(validate_table_name("").is_err());
        assert!(validate_table_name("2products").is_err());
        assert!(validate_table_name("Products").is_err());
        assert!(validate_table_name(&"a".repeat(64)).is_err());
    }
}
