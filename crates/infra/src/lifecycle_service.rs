//! Product lifecycle orchestration.
//!
//! The `LifecycleService` turns caller intents into repository calls and
//! repository outcomes into typed results.
//!
//! ## Transition flow
//!
//! ```text
//! Transition
//!   ↓
//! 1. conditional_transition(id, expected sources → target)   (one atomic write)
//!   ↓ matched 1 → Ok
//!   ↓ matched 0
//! 2. get(id)                                                   (classification probe)
//!   ↓ None → NotFound
//!   ↓ Some(p) → InvalidTransition { current: p.status }
//! ```
//!
//! The probe runs only after a rejected write and may observe a state newer
//! than the one that rejected it; the observed state is reported as-is.
//! Nothing is retried.

use thiserror::Error;
use tracing::{info, instrument, warn};

use catalog_core::{AuctionId, DomainError, ProductId};
use catalog_products::{NewProduct, Product, ProductFilter, ProductStatus, Transition};

use crate::product_store::{ProductRepository, StoreError};

/// Outcome of a catalog operation that did not succeed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("product not found")]
    NotFound,

    /// The product exists but its current status is not an allowed source.
    #[error("cannot {operation} a product in status {current}")]
    InvalidTransition {
        operation: &'static str,
        current: ProductStatus,
    },

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("corrupt product data: {0}")]
    Corrupt(String),
}

impl From<StoreError> for CatalogError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Unavailable(msg) => CatalogError::StorageUnavailable(msg),
            StoreError::Corrupt(msg) => CatalogError::Corrupt(msg),
            StoreError::Rejected(msg) => CatalogError::Validation(msg),
        }
    }
}

impl From<DomainError> for CatalogError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => CatalogError::Validation(msg),
            DomainError::InvalidId(msg) => CatalogError::Validation(msg),
        }
    }
}

/// Lifecycle state machine in front of a `ProductRepository`.
///
/// Holds no locks and no state of its own: every call is one repository round
/// trip (two for a rejected transition). Concurrency control lives entirely
/// in `ProductRepository::conditional_transition`.
#[derive(Debug, Clone)]
pub struct LifecycleService<R> {
    repo: R,
}

impl<R> LifecycleService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &R {
        &self.repo
    }
}

impl<R> LifecycleService<R>
where
    R: ProductRepository,
{
    /// Create a product. Whatever the caller intended, it starts `Pending`.
    #[instrument(skip(self, product), fields(seller_id = %product.seller_id), err(level = "warn"))]
    pub async fn create_product(&self, product: NewProduct) -> Result<ProductId, CatalogError> {
        product.validate()?;
        let id = self.repo.create(product).await?;
        info!(product_id = %id, "product created");
        Ok(id)
    }

    #[instrument(skip(self), fields(product_id = %id), err(level = "warn"))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, CatalogError> {
        self.repo.get(id).await?.ok_or(CatalogError::NotFound)
    }

    #[instrument(skip(self), err)]
    pub async fn list_products(&self, filter: ProductFilter) -> Result<Vec<Product>, CatalogError> {
        Ok(self.repo.list(filter).await?)
    }

    /// Administrative overwrite of a product's mutable fields.
    ///
    /// `path_id` is the id the caller addressed; it must agree with the body.
    /// Bypasses the transition table and carries no status guard.
    #[instrument(
        skip(self, product),
        fields(product_id = %path_id, status = %product.status),
        err(level = "warn")
    )]
    pub async fn update_product(
        &self,
        path_id: ProductId,
        mut product: Product,
    ) -> Result<(), CatalogError> {
        if product.id != path_id {
            return Err(CatalogError::Validation(format!(
                "product id mismatch: path {path_id}, body {}",
                product.id
            )));
        }
        product.validate()?;
        product.normalize_auction_ref();

        match self.repo.replace(&product).await? {
            0 => Err(CatalogError::NotFound),
            _ => {
                info!("product updated");
                Ok(())
            }
        }
    }

    #[instrument(skip(self), fields(product_id = %id), err(level = "warn"))]
    pub async fn delete_product(&self, id: ProductId) -> Result<(), CatalogError> {
        match self.repo.delete(id).await? {
            0 => Err(CatalogError::NotFound),
            _ => {
                info!("product deleted");
                Ok(())
            }
        }
    }

    pub async fn prepare_for_auction(&self, id: ProductId) -> Result<(), CatalogError> {
        self.transition(id, Transition::PrepareForAuction).await
    }

    pub async fn set_in_auction(
        &self,
        id: ProductId,
        auction_id: AuctionId,
    ) -> Result<(), CatalogError> {
        self.transition(id, Transition::SetInAuction { auction_id }).await
    }

    pub async fn set_sold(&self, id: ProductId) -> Result<(), CatalogError> {
        self.transition(id, Transition::SetSold).await
    }

    pub async fn set_failed_in_auction(&self, id: ProductId) -> Result<(), CatalogError> {
        self.transition(id, Transition::SetFailedInAuction).await
    }

    pub async fn withdraw(&self, id: ProductId) -> Result<(), CatalogError> {
        self.transition(id, Transition::Withdraw).await
    }

    /// Run one lifecycle operation as a single conditional write. Rejections
    /// are logged here at `warn`; storage failures by the repository span.
    #[instrument(skip(self), fields(product_id = %id, operation = %transition))]
    pub async fn transition(
        &self,
        id: ProductId,
        transition: Transition,
    ) -> Result<(), CatalogError> {
        let update = transition.conditional_update();
        if self.repo.conditional_transition(id, &update).await? > 0 {
            info!(status = %update.new_status, "transition applied");
            return Ok(());
        }

        match self.repo.get(id).await? {
            None => {
                warn!("transition rejected: product not found");
                Err(CatalogError::NotFound)
            }
            Some(current) => {
                warn!(current = %current.status, "transition rejected by current status");
                Err(CatalogError::InvalidTransition {
                    operation: transition.name(),
                    current: current.status,
                })
            }
        }
    }
}
