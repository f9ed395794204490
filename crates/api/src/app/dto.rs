use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::Deserialize;

use catalog_core::{AuctionId, ProductId};
use catalog_products::{NewProduct, Product, ProductCategory, ProductFilter, ProductStatus};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /catalog/products`. Any `status` or `id` the client sends is ignored.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    #[serde(default)]
    pub category: ProductCategory,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub starting_price: Decimal,
    pub seller_id: String,
}

impl From<CreateProductRequest> for NewProduct {
    fn from(body: CreateProductRequest) -> Self {
        NewProduct {
            category: body.category,
            title: body.title,
            description: body.description,
            starting_price: body.starting_price,
            seller_id: body.seller_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SetInAuctionRequest {
    pub auction_id: AuctionId,
}

/// Query string of `GET /catalog/products`. Values are matched case-insensitively.
#[derive(Debug, Default, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

impl ListProductsQuery {
    pub fn into_filter(self) -> Result<ProductFilter, axum::response::Response> {
        let mut filter = ProductFilter::all();
        if let Some(raw) = self.category.filter(|v| !v.is_empty()) {
            let category: ProductCategory = raw.parse().map_err(|e: catalog_core::DomainError| {
                errors::json_error(StatusCode::BAD_REQUEST, "invalid_category", e.to_string())
            })?;
            filter = filter.with_category(category);
        }
        if let Some(raw) = self.status.filter(|v| !v.is_empty()) {
            let status: ProductStatus = raw.parse().map_err(|e: catalog_core::DomainError| {
                errors::json_error(StatusCode::BAD_REQUEST, "invalid_status", e.to_string())
            })?;
            filter = filter.with_status(status);
        }
        Ok(filter)
    }
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn product_to_json(p: Product) -> serde_json::Value {
    serde_json::json!({
        "id": p.id.to_string(),
        "category": p.category.as_str(),
        "title": p.title,
        "description": p.description,
        "starting_price": p.starting_price,
        "status": p.status.as_str(),
        "created_at": p.created_at.to_rfc3339(),
        "seller_id": p.seller_id,
        "current_auction_id": p.current_auction_id.map(|a| a.to_string()),
    })
}

pub fn parse_product_id(raw: &str) -> Result<ProductId, axum::response::Response> {
    raw.parse().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id")
    })
}

/// Unwraps a JSON body extracted as `Result`, so malformed input gets the
/// usual `{"error","message"}` 400 instead of axum's plain-text rejection.
/// Handlers call this after the permission check.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, axum::response::Response> {
    match body {
        Ok(Json(v)) => Ok(v),
        Err(rejection) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            rejection.body_text(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_request_ignores_client_status() {
        let body: CreateProductRequest = serde_json::from_value(serde_json::json!({
            "title": "Desk",
            "starting_price": "40.00",
            "seller_id": "s-1",
            "status": "Sold",
        }))
        .unwrap();
        let new: NewProduct = body.into();
        assert_eq!(new.category, ProductCategory::None);
        assert_eq!(new.starting_price, Decimal::new(4000, 2));
    }

    #[test]
    fn query_parses_filters() {
        let q = ListProductsQuery {
            category: Some("art".to_string()),
            status: Some("InAuction".to_string()),
        };
        let f = q.into_filter().unwrap();
        assert_eq!(f.category, Some(ProductCategory::Art));
        assert_eq!(f.status, Some(ProductStatus::InAuction));

        let bad = ListProductsQuery {
            category: Some("furniture".to_string()),
            status: None,
        };
        assert!(bad.into_filter().is_err());
    }
}
