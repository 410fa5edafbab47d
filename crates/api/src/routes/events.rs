//! Storage event intake.
//!
//! The object store posts its notifications here. Each event is handled before
//! the delivery is acknowledged; a retryable failure answers 503 so the
//! notifier delivers the whole notification again.

use axum::{Json, Router, extract::State, routing::post};
use serde::Serialize;
use tracing::{debug, info};

use crate::{AppState, error::ApiError};
use quill_core::events::parse_s3_notification;
use quill_core::post::PostStore;
use quill_shared::AppError;

/// Creates the event routes.
pub fn routes<S: PostStore + 'static>() -> Router<AppState<S>> {
    Router::new().route("/events/object-created", post(object_created::<S>))
}

/// Outcome of a handled notification.
#[derive(Debug, Default, Serialize)]
pub struct EventsResponse {
    /// Events whose every step succeeded.
    pub processed: usize,
    /// Events that failed for good (missing original, not an image, deleted post).
    pub failed: usize,
    /// Events for buckets other than the originals bucket.
    pub ignored: usize,
}

/// POST `/events/object-created`
/// Handle the object-created records of an S3 event notification.
async fn object_created<S: PostStore + 'static>(
    State(state): State<AppState<S>>,
    body: String,
) -> Result<Json<EventsResponse>, ApiError> {
    let events = parse_s3_notification(&body)?;

    let _slot = state.event_slots.try_acquire().map_err(|_| {
        AppError::ServiceUnavailable("too many notifications in flight".into())
    })?;

    let mut response = EventsResponse::default();
    let mut retryable = Vec::new();
    for event in &events {
        debug!(bucket = %event.bucket, key = %event.key, "Handling object-created event");
        match state.uploads.handle(event).await {
            None => response.ignored += 1,
            Some(report) if report.is_success() => response.processed += 1,
            Some(report) if report.is_retryable() => retryable.push(event.key.clone()),
            Some(_) => response.failed += 1,
        }
    }

    if !retryable.is_empty() {
        return Err(AppError::ServiceUnavailable(format!(
            "transient failure handling {}",
            retryable.join(", ")
        ))
        .into());
    }

    info!(
        processed = response.processed,
        failed = response.failed,
        ignored = response.ignored,
        "Object-created notification handled"
    );
    Ok(Json(response))
}
