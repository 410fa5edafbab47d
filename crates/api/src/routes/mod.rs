//! API route definitions.

use axum::{Router, middleware};

use crate::{
    AppState,
    middleware::{bearer_auth, webhook_auth},
};
use quill_core::post::PostStore;

pub mod events;
pub mod health;
pub mod posts;

/// Creates the API router: public health, token-checked event intake, and
/// bearer-protected posts.
pub fn api_routes_with_state<S: PostStore + 'static>(state: AppState<S>) -> Router<AppState<S>> {
    let protected_routes = Router::new()
        .merge(posts::routes())
        .layer(middleware::from_fn(bearer_auth));

    let event_routes = Router::new()
        .merge(events::routes())
        .layer(middleware::from_fn_with_state(state, webhook_auth::<S>));

    Router::new()
        .merge(health::routes())
        .merge(event_routes)
        .merge(protected_routes)
}
