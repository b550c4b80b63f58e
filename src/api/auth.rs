// =============================================================================
// Bearer Token Authentication — Axum extractor
// =============================================================================
//
// Guards the endpoints that mutate server state (currently the watchlist
// update).  The expected token comes from `STOCKSCOPE_ADMIN_TOKEN`; read-only
// analysis endpoints stay public.
//
//   async fn handler(_auth: AuthBearer, ...) { ... }
//
// A missing or wrong token short-circuits the request with 403 Forbidden.
// =============================================================================

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Environment variable holding the admin token.
pub const ADMIN_TOKEN_ENV: &str = "STOCKSCOPE_ADMIN_TOKEN";

/// Compare two byte slices in constant time.  A length mismatch returns early;
/// the expected token length is not secret.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check an `Authorization` header value against `expected`.
fn check_bearer(header: Option<&str>, expected: &str) -> Result<String, AuthRejection> {
    if expected.is_empty() {
        warn!("{ADMIN_TOKEN_ENV} is not set, rejecting authenticated request");
        return Err(AuthRejection::new("Server authentication not configured"));
    }

    let token = match header.and_then(|v| v.strip_prefix("Bearer ")) {
        Some(t) => t,
        None => {
            warn!("Missing or malformed Authorization header");
            return Err(AuthRejection::new("Missing or invalid authorization token"));
        }
    };

    if !constant_time_eq(token.as_bytes(), expected.as_bytes()) {
        warn!("Invalid admin token presented");
        return Err(AuthRejection::new("Invalid authorization token"));
    }

    Ok(token.to_string())
}

// =============================================================================
// Extractor
// =============================================================================

/// Yields the presented token once it matches `STOCKSCOPE_ADMIN_TOKEN`.
pub struct AuthBearer(pub String);

#[derive(Debug)]
pub struct AuthRejection {
    status: StatusCode,
    message: &'static str,
}

impl AuthRejection {
    fn new(message: &'static str) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, axum::Json(body)).into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthBearer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Read per request so the token can be rotated without a restart.
        let expected = std::env::var(ADMIN_TOKEN_ENV).unwrap_or_default();
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());

        check_bearer(header, &expected).map(AuthBearer)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_eq_identical() {
        assert!(constant_time_eq(b"hello", b"hello"));
    }

    #[test]
    fn constant_time_eq_different() {
        assert!(!constant_time_eq(b"hello", b"world"));
    }

    #[test]
    fn constant_time_eq_different_lengths() {
        assert!(!constant_time_eq(b"short", b"longer_string"));
    }

    #[test]
    fn constant_time_eq_single_bit_diff() {
        assert!(!constant_time_eq(b"\x00", b"\x01"));
    }

    #[test]
    fn bearer_accepts_matching_token() {
        let token = check_bearer(Some("Bearer s3cret"), "s3cret").unwrap();
        assert_eq!(token, "s3cret");
    }

    #[test]
    fn bearer_rejects_wrong_or_missing() {
        assert!(check_bearer(Some("Bearer nope"), "s3cret").is_err());
        assert!(check_bearer(Some("s3cret"), "s3cret").is_err());
        assert!(check_bearer(None, "s3cret").is_err());
    }

    #[test]
    fn unconfigured_server_rejects_everything() {
        let err = check_bearer(Some("Bearer "), "").unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }
}
