//! Bearer-token middleware for protected routes.
//!
//! The token is only extracted here. Resolving it to an owner happens in
//! `PostService`, so every post operation goes through the same check.

use axum::{
    Json,
    extract::{FromRequestParts, Request},
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// Extracts the bearer token from the Authorization header.
pub(crate) fn extract_bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

pub(crate) fn missing_token() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "missing_token",
            "message": "Authorization header with Bearer token is required"
        })),
    )
        .into_response()
}

/// Rejects requests without a bearer token and stores the token in request
/// extensions for handlers.
pub async fn bearer_auth(mut request: Request, next: Next) -> Response {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token)
        .map(str::to_owned);

    let Some(token) = token else {
        return missing_token();
    };

    request.extensions_mut().insert(BearerToken(token));
    next.run(request).await
}

/// The caller's raw bearer token.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl BearerToken {
    /// The token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(missing_token)
    }
}
