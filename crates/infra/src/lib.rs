//! Infrastructure layer: product persistence, lifecycle orchestration, config.

pub mod config;
pub mod lifecycle_service;
pub mod product_store;

pub use config::{ConfigError, StoreBackend, StoreConfig};
pub use lifecycle_service::{CatalogError, LifecycleService};
pub use product_store::{
    InMemoryProductRepository, PostgresProductRepository, ProductRepository, StoreError,
};
