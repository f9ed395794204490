use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use catalog_core::ProductId;
use catalog_products::{ConditionalUpdate, NewProduct, Product, ProductFilter};

/// Product store operation error.
///
/// These are **infrastructure errors**. "Record missing" and "status did not
/// match" are not errors at this layer: they show up as `None` / a zero
/// match count and are classified by the lifecycle service.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store could not be reached or the operation did not complete.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A stored record could not be decoded into a `Product`.
    #[error("corrupt record: {0}")]
    Corrupt(String),

    /// The store refused the write through one of its integrity constraints.
    #[error("rejected by store: {0}")]
    Rejected(String),
}

/// Persistence boundary for catalog products.
///
/// ## Atomicity
///
/// `conditional_transition()` is the only concurrency-controlled write. The
/// status comparison and the write must be evaluated as one atomic step per
/// record: of two racing calls that expect the same source status, exactly one
/// may observe the match. Every other operation is a plain read or write.
///
/// ## Match counts
///
/// `replace()`, `conditional_transition()` and `delete()` return the number of
/// records matched (0 or 1). A zero from `conditional_transition()` does not
/// say whether the record is missing or in another state.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Persist a new product. Assigns the id and `created_at`; status is always `Pending`.
    async fn create(&self, product: NewProduct) -> Result<ProductId, StoreError>;

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Snapshot of matching products, ordered by `created_at` ascending.
    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError>;

    /// Overwrite the mutable fields of an existing product.
    ///
    /// `id`, `created_at` and `seller_id` are never changed. No status guard.
    async fn replace(&self, product: &Product) -> Result<u64, StoreError>;

    /// Compare-and-set on status; see the trait docs.
    async fn conditional_transition(
        &self,
        id: ProductId,
        update: &ConditionalUpdate,
    ) -> Result<u64, StoreError>;

    /// Unconditional removal.
    async fn delete(&self, id: ProductId) -> Result<u64, StoreError>;
}

#[async_trait]
impl<S> ProductRepository for Arc<S>
where
    S: ProductRepository + ?Sized,
{
    async fn create(&self, product: NewProduct) -> Result<ProductId, StoreError> {
        (**self).create(product).await
    }

    async fn get(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        (**self).get(id).await
    }

    async fn list(&self, filter: ProductFilter) -> Result<Vec<Product>, StoreError> {
        (**self).list(filter).await
    }

    async fn replace(&self, product: &Product) -> Result<u64, StoreError> {
        (**self).replace(product).await
    }

    async fn conditional_transition(
        &self,
        id: ProductId,
        update: &ConditionalUpdate,
    ) -> Result<u64, StoreError> {
        (**self).conditional_transition(id, update).await
    }

    async fn delete(&self, id: ProductId) -> Result<u64, StoreError> {
        (**self).delete(id).await
    }
}
