use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};

use catalog_products::{Product, Transition};

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::authz::require_level;
use crate::context::{CallerContext, PermissionLevel};

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/prepare-auction", put(prepare_for_auction))
        .route("/:id/in-auction", put(set_in_auction))
        .route("/:id/sold", put(set_sold))
        .route("/:id/failed-in-auction", put(set_failed_in_auction))
        .route("/:id/withdraw", put(withdraw))
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<dto::ListProductsQuery>,
) -> axum::response::Response {
    if let Err(resp) = require_level(&caller, PermissionLevel::User) {
        return resp;
    }
    let filter = match query.into_filter() {
        Ok(f) => f,
        Err(resp) => return resp,
    };

    match services.catalog.list_products(filter).await {
        Ok(products) => {
            let items = products
                .into_iter()
                .map(dto::product_to_json)
                .collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_level(&caller, PermissionLevel::User) {
        return resp;
    }
    let id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.get_product(id).await {
        Ok(product) => (StatusCode::OK, Json(dto::product_to_json(product))).into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    body: Result<Json<dto::CreateProductRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require_level(&caller, PermissionLevel::Admin) {
        return resp;
    }
    let body = match dto::json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.create_product(body.into()).await {
        Ok(id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "id": id.to_string() })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}

/// Body is a full product record (the shape `GET` returns); `seller_id` and
/// `created_at` are never overwritten.
pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<Product>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require_level(&caller, PermissionLevel::Admin) {
        return resp;
    }
    let id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let body = match dto::json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.update_product(id, body).await {
        Ok(()) => {
            (StatusCode::OK, Json(serde_json::json!({ "id": id.to_string() }))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = require_level(&caller, PermissionLevel::Admin) {
        return resp;
    }
    let id = match dto::parse_product_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.catalog.delete_product(id).await {
        Ok(()) => {
            (StatusCode::OK, Json(serde_json::json!({ "id": id.to_string() }))).into_response()
        }
        Err(e) => errors::catalog_error_to_response(e),
    }
}

pub async fn prepare_for_auction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let transition = Transition::PrepareForAuction;
    run_transition(&services, &caller, PermissionLevel::Admin, &id, transition).await
}

pub async fn set_in_auction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::SetInAuctionRequest>, JsonRejection>,
) -> axum::response::Response {
    if let Err(resp) = require_level(&caller, PermissionLevel::User) {
        return resp;
    }
    let body = match dto::json_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let transition = Transition::SetInAuction {
        auction_id: body.auction_id,
    };
    run_transition(&services, &caller, PermissionLevel::User, &id, transition).await
}

pub async fn set_sold(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    run_transition(&services, &caller, PermissionLevel::User, &id, Transition::SetSold).await
}

pub async fn set_failed_in_auction(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let transition = Transition::SetFailedInAuction;
    run_transition(&services, &caller, PermissionLevel::User, &id, transition).await
}

pub async fn withdraw(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    run_transition(&services, &caller, PermissionLevel::Admin, &id, Transition::Withdraw).await
}

async fn run_transition(
    services: &AppServices,
    caller: &CallerContext,
    required: PermissionLevel,
    raw_id: &str,
    transition: Transition,
) -> axum::response::Response {
    if let Err(resp) = require_level(caller, required) {
        return resp;
    }
    let id = match dto::parse_product_id(raw_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    match services.catalog.transition(id, transition).await {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "id": id.to_string(),
                "status": transition.target().as_str(),
            })),
        )
            .into_response(),
        Err(e) => errors::catalog_error_to_response(e),
    }
}
