use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use catalog_infra::CatalogError;

pub fn catalog_error_to_response(err: CatalogError) -> axum::response::Response {
    match err {
        CatalogError::NotFound => {
            json_error(StatusCode::NOT_FOUND, "not_found", "product not found")
        }
        e @ CatalogError::InvalidTransition { .. } => {
            json_error(StatusCode::CONFLICT, "invalid_transition", e.to_string())
        }
        CatalogError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        CatalogError::StorageUnavailable(msg) => {
            json_error(StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable", msg)
        }
        CatalogError::Corrupt(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "corrupt_data", msg)
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_products::ProductStatus;

    #[test]
    fn status_mapping() {
        let cases = [
            (CatalogError::NotFound, StatusCode::NOT_FOUND),
            (
                CatalogError::InvalidTransition {
                    operation: "set_sold",
                    current: ProductStatus::Available,
                },
                StatusCode::CONFLICT,
            ),
            (CatalogError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (
                CatalogError::StorageUnavailable("down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (CatalogError::Corrupt("bad".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (err, status) in cases {
            assert_eq!(catalog_error_to_response(err).status(), status);
        }
    }
}
