use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use depot_auth::TokenCodec;

use crate::app::errors::json_error;
use crate::context::PrincipalContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenCodec>,
}

/// Bearer-token guard for everything behind `/api`.
///
/// A missing or empty `Authorization: Bearer ...` header is 401; a header
/// that is present but fails verification (bad signature, malformed,
/// expired) is 400.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let token = match extract_bearer(req.headers()) {
        Ok(t) => t.to_string(),
        Err(resp) => return resp,
    };

    let claims = match state.tokens.decode(&token) {
        Ok(c) => c,
        Err(e) => return json_error(StatusCode::BAD_REQUEST, "invalid_token", e.to_string()),
    };

    req.extensions_mut()
        .insert(PrincipalContext::new(claims.sub, claims.name));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, Response> {
    let missing = || json_error(StatusCode::UNAUTHORIZED, "missing_token", "missing bearer token");

    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(missing)?;

    let header = header.to_str().map_err(|_| missing())?;

    let header = header.strip_prefix("Bearer ").ok_or_else(missing)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(missing());
    }

    Ok(token)
}
