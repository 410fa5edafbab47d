//! Shared-token check for storage notifications.
//!
//! The object store is configured with the same token (a MinIO webhook
//! target's `auth_token`) and sends it as a bearer credential.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;

use super::auth::{extract_bearer_token, missing_token};
use crate::{AppState, error::ApiError};
use quill_core::post::PostStore;
use quill_shared::AppError;

/// Compares in constant time; an empty expected token matches nothing.
fn token_matches(presented: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

/// Rejects notifications that do not carry the configured webhook token.
pub async fn webhook_auth<S: PostStore>(
    State(state): State<AppState<S>>,
    request: Request,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_bearer_token);

    match presented {
        Some(token) if token_matches(token, &state.webhook_token) => next.run(request).await,
        Some(_) => ApiError(AppError::Unauthorized("invalid webhook token".into())).into_response(),
        None => missing_token(),
    }
}
