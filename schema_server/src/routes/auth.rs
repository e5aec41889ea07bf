//! Shared-secret bearer check for the JSON event and command routes.

use axum::extract::{Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use super::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Check an `Authorization: Bearer <token>` header against the configured token.
///
/// Both sides are run through HMAC so the comparison is constant-time.
pub fn validate_token(secret: &str, authorization: &str) -> bool {
    if secret.is_empty() {
        tracing::warn!("Command token not configured, skipping authentication");
        return true;
    }

    let Some(token) = authorization.strip_prefix("Bearer ") else {
        return false;
    };

    let mut expected = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    expected.update(secret.as_bytes());
    let expected = expected.finalize().into_bytes();

    let mut presented = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    presented.update(token.as_bytes());

    presented.verify_slice(&expected).is_ok()
}

pub async fn require_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !validate_token(&state.ctx.config.command_token, authorization) {
        tracing::warn!(path = %request.uri().path(), "Unauthorized request rejected");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    next.run(request).await
}
