//! Bearer-token guard for the admin routes.

use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use subtle::ConstantTimeEq;

use crate::{AppState, RpcError};

/// Compare a presented token with the configured one in constant time.
fn token_matches(presented: Option<&str>, expected: &str) -> bool {
    presented.is_some_and(|token| bool::from(token.as_bytes().ct_eq(expected.as_bytes())))
}

/// Reject the request with 401 unless it carries `Authorization: Bearer <admin_token>`.
pub async fn require_admin(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RpcError> {
    let Some(expected) = state.admin_token.as_deref() else {
        return Err(RpcError::Unauthorized);
    };
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);
    if !token_matches(presented, expected) {
        tracing::debug!(path = %request.uri().path(), "admin request rejected");
        return Err(RpcError::Unauthorized);
    }
    state.counters.increment("admin");
    Ok(next.run(request).await)
}
