//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST routes for posts and their attachments
//! - Intake for object-created storage notifications
//! - Bearer-token middleware
//! - Error-to-response mapping

pub mod error;
pub mod middleware;
pub mod routes;


use std::sync::Arc;

use axum::Router;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use quill_core::events::UploadHandler;
use quill_core::post::{PostService, PostStore};
use quill_shared::JwtService;

/// Largest request body accepted; uploads go straight to object storage.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers.
pub struct AppState<S: PostStore> {
    /// Post operations on behalf of the caller.
    pub posts: Arc<PostService<S, JwtService>>,
    /// Binds attachments and renders thumbnails for uploaded originals.
    pub uploads: Arc<UploadHandler<S>>,
    /// Token the object store presents on notifications.
    pub webhook_token: Arc<str>,
    /// Notifications that may be handled concurrently.
    pub event_slots: Arc<Semaphore>,
}

impl<S: PostStore> AppState<S> {
    /// Create the shared state.
    #[must_use]
    pub fn new(
        posts: Arc<PostService<S, JwtService>>,
        uploads: Arc<UploadHandler<S>>,
        webhook_token: impl Into<Arc<str>>,
        max_events_in_flight: usize,
    ) -> Self {
        Self {
            posts,
            uploads,
            webhook_token: webhook_token.into(),
            event_slots: Arc::new(Semaphore::new(max_events_in_flight)),
        }
    }
}

impl<S: PostStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            posts: Arc::clone(&self.posts),
            uploads: Arc::clone(&self.uploads),
            webhook_token: Arc::clone(&self.webhook_token),
            event_slots: Arc::clone(&self.event_slots),
        }
    }
}

/// Creates the main application router.
pub fn create_router<S: PostStore + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
