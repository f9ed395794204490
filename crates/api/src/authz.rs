//! API-side authorization guard.
//!
//! Runs at the route boundary, before any service call, so the lifecycle
//! service and repositories stay authorization-agnostic.

use axum::http::StatusCode;
use axum::response::Response;

use crate::app::errors;
use crate::context::{CallerContext, PermissionLevel};

/// Reject the request with 403 unless the caller holds at least `required`.
pub fn require_level(caller: &CallerContext, required: PermissionLevel) -> Result<(), Response> {
    if caller.level().satisfies(required) {
        return Ok(());
    }
    Err(errors::json_error(
        StatusCode::FORBIDDEN,
        "forbidden",
        format!("requires permission level {:?}", required),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_is_forbidden_admin_routes() {
        let user = CallerContext::new(PermissionLevel::User);
        let admin = CallerContext::new(PermissionLevel::Admin);

        assert!(require_level(&user, PermissionLevel::User).is_ok());
        assert!(require_level(&admin, PermissionLevel::Admin).is_ok());

        let denied = require_level(&user, PermissionLevel::Admin).unwrap_err();
        assert_eq!(denied.status(), StatusCode::FORBIDDEN);
    }
}
