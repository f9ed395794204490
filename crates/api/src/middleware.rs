use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::app::errors;
use crate::context::{CallerContext, PERMISSION_LEVEL_HEADER, PermissionLevel};

/// Attach a `CallerContext` derived from `x-permission-level`.
///
/// Missing or malformed header → 401.
pub async fn caller_context_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let level = extract_permission_level(req.headers()).map_err(|msg| {
        errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", msg)
    })?;

    req.extensions_mut().insert(CallerContext::new(level));

    Ok(next.run(req).await)
}

fn extract_permission_level(headers: &HeaderMap) -> Result<PermissionLevel, &'static str> {
    let header = headers
        .get(PERMISSION_LEVEL_HEADER)
        .ok_or("missing x-permission-level header")?;

    let header = header
        .to_str()
        .map_err(|_| "x-permission-level header is not valid text")?;

    PermissionLevel::from_header_value(header).ok_or("unrecognized permission level")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn extracts_level_from_header() {
        let mut headers = HeaderMap::new();
        assert!(extract_permission_level(&headers).is_err());

        headers.insert(PERMISSION_LEVEL_HEADER, HeaderValue::from_static("2"));
        assert_eq!(extract_permission_level(&headers), Ok(PermissionLevel::Admin));

        headers.insert(PERMISSION_LEVEL_HEADER, HeaderValue::from_static("root"));
        assert!(extract_permission_level(&headers).is_err());
    }
}
