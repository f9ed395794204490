//! Products domain module.
//!
//! This crate contains the catalog product entity and its lifecycle rules,
//! implemented purely as deterministic domain logic (no IO, no HTTP, no storage).

pub mod filter;
pub mod lifecycle;
pub mod product;

pub use filter::ProductFilter;
pub use lifecycle::{AuctionEffect, ConditionalUpdate, Transition};
pub use product::{NewProduct, Product, ProductCategory, ProductStatus};
