//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: repository selection and the lifecycle service
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use catalog_infra::{StoreConfig, StoreError};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router around already-constructed services.
pub fn build_app(services: Arc<services::AppServices>) -> Router {
    // Catalog routes: caller context is resolved before the services are attached.
    let protected = routes::router().layer(
        ServiceBuilder::new()
            .layer(axum::middleware::from_fn(middleware::caller_context_middleware))
            .layer(Extension(services)),
    );

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/catalog", protected)
}

/// Build the router with the repository selected by `config` (entrypoint used by `main.rs`).
pub async fn build_app_from_config(config: &StoreConfig) -> Result<Router, StoreError> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(build_app(services))
}
