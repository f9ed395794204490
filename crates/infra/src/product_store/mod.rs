//! Product persistence boundary.
//!
//! `ProductRepository` is the storage-agnostic contract; adapters live in the
//! submodules and are selected at bootstrap from `StoreConfig`.

pub mod in_memory;
pub mod postgres;
pub mod r#trait;

pub use in_memory::InMemoryProductRepository;
pub use postgres::PostgresProductRepository;
pub use r#trait::{ProductRepository, StoreError};
