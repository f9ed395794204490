use axum::Router;

pub mod products;
pub mod system;

/// Router for all endpoints that need a caller context.
pub fn router() -> Router {
    Router::new().nest("/products", products::router())
}
