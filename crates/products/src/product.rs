use core::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use catalog_core::{AuctionId, DomainError, DomainResult, ProductId};

/// Informational product classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ProductCategory {
    #[default]
    None,
    Art,
    Electronics,
    Fashion,
    Collectibles,
    Jewelry,
    Vehicles,
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 8] = [
        ProductCategory::None,
        ProductCategory::Art,
        ProductCategory::Electronics,
        ProductCategory::Fashion,
        ProductCategory::Collectibles,
        ProductCategory::Jewelry,
        ProductCategory::Vehicles,
        ProductCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::None => "None",
            ProductCategory::Art => "Art",
            ProductCategory::Electronics => "Electronics",
            ProductCategory::Fashion => "Fashion",
            ProductCategory::Collectibles => "Collectibles",
            ProductCategory::Jewelry => "Jewelry",
            ProductCategory::Vehicles => "Vehicles",
            ProductCategory::Other => "Other",
        }
    }
}

impl core::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown product category: {s}")))
    }
}

/// Product lifecycle state.
///
/// This is the only field guarded by conditional writes. Stored as its variant
/// name (e.g. `"InAuction"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductStatus {
    /// Awaiting moderation.
    Pending,
    /// Approved and free to be picked up by an auction.
    Available,
    PendingAuction,
    /// Held by exactly one auction (`current_auction_id` is set).
    InAuction,
    Sold,
    FailedInAuction,
    Withdrawn,
}

impl ProductStatus {
    pub const ALL: [ProductStatus; 7] = [
        ProductStatus::Pending,
        ProductStatus::Available,
        ProductStatus::PendingAuction,
        ProductStatus::InAuction,
        ProductStatus::Sold,
        ProductStatus::FailedInAuction,
        ProductStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Pending => "Pending",
            ProductStatus::Available => "Available",
            ProductStatus::PendingAuction => "PendingAuction",
            ProductStatus::InAuction => "InAuction",
            ProductStatus::Sold => "Sold",
            ProductStatus::FailedInAuction => "FailedInAuction",
            ProductStatus::Withdrawn => "Withdrawn",
        }
    }
}

impl core::fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProductStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown product status: {s}")))
    }
}

/// Seller-supplied fields for a product that does not exist yet.
///
/// Carries no `status` or `id`: the repository assigns the id and every
/// product starts out `Pending`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub category: ProductCategory,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub seller_id: String,
}

impl NewProduct {
    pub fn validate(&self) -> DomainResult<()> {
        validate_listing(&self.title, self.starting_price)?;
        if self.seller_id.trim().is_empty() {
            return Err(DomainError::validation("seller_id cannot be empty"));
        }
        Ok(())
    }

    /// Materialize the stored record. Status is always `Pending`.
    pub fn into_product(self, id: ProductId, created_at: DateTime<Utc>) -> Product {
        Product {
            id,
            category: self.category,
            title: self.title,
            description: self.description,
            starting_price: self.starting_price,
            status: ProductStatus::Pending,
            created_at,
            seller_id: self.seller_id,
            current_auction_id: None,
        }
    }
}

/// Catalog product as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category: ProductCategory,
    pub title: String,
    pub description: String,
    pub starting_price: Decimal,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub seller_id: String,
    pub current_auction_id: Option<AuctionId>,
}

impl Product {
    /// Validate a full record before an administrative overwrite.
    ///
    /// Edits may set any status, but the auction reference must agree with it.
    pub fn validate(&self) -> DomainResult<()> {
        validate_listing(&self.title, self.starting_price)?;
        match (self.status, self.current_auction_id) {
            (ProductStatus::InAuction, None) => Err(DomainError::validation(
                "current_auction_id is required when status is InAuction",
            )),
            _ => Ok(()),
        }
    }

    /// Drop an auction reference that the current status does not allow.
    pub fn normalize_auction_ref(&mut self) {
        if self.status != ProductStatus::InAuction {
            self.current_auction_id = None;
        }
    }
}

fn validate_listing(title: &str, starting_price: Decimal) -> DomainResult<()> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("title cannot be empty"));
    }
    if starting_price < Decimal::ZERO {
        return Err(DomainError::validation("starting_price cannot be negative"));
    }
    Ok(())
}
