//! Post routes.
//!
//! All handlers require a bearer token. The owner is resolved from it by
//! `PostService`; request bodies never carry an owner.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{AppState, error::ApiError, middleware::BearerToken};
use quill_core::attachment::UploadTicket;
use quill_core::post::{NewPost, Post, PostPatch, PostStore, PostSummary};
use quill_shared::PostId;

/// Creates the post routes.
pub fn routes<S: PostStore + 'static>() -> Router<AppState<S>> {
    Router::new()
        .route("/posts", get(list_posts::<S>).post(create_post::<S>))
        // PATCH takes a post ID, DELETE the packed `{post_id}+{created_at}` key.
        .route(
            "/posts/{post_ref}",
            patch(update_post::<S>).delete(delete_post::<S>),
        )
        .route("/posts/{post_ref}/attachment", post(request_upload::<S>))
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for creating a post.
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePostRequest {
    /// Title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Request body for updating a post.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    /// New title.
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// New body.
    pub body: String,
    /// New publication timestamp.
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    /// New publication state.
    #[serde(default)]
    pub is_published: bool,
}

/// Response for listing posts.
#[derive(Debug, Serialize)]
pub struct ListPostsResponse {
    /// The caller's posts.
    pub items: Vec<PostSummary>,
}

/// Response for a created post.
#[derive(Debug, Serialize)]
pub struct PostResponse {
    /// The stored post.
    pub item: Post,
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/posts`
/// List the caller's posts.
async fn list_posts<S: PostStore + 'static>(
    State(state): State<AppState<S>>,
    token: BearerToken,
) -> Result<Json<ListPostsResponse>, ApiError> {
    let items = state.posts.list(token.as_str()).await?;
    Ok(Json(ListPostsResponse { items }))
}

/// POST `/posts`
/// Create a post owned by the caller.
async fn create_post<S: PostStore + 'static>(
    State(state): State<AppState<S>>,
    token: BearerToken,
    Json(payload): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    payload.validate()?;

    let item = state
        .posts
        .create(
            NewPost {
                title: payload.title,
                body: payload.body,
            },
            token.as_str(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse { item })))
}

/// PATCH `/posts/{post_id}`
/// Overwrite title, body, and publication state of a post the caller owns.
async fn update_post<S: PostStore + 'static>(
    State(state): State<AppState<S>>,
    token: BearerToken,
    Path(post_id): Path<PostId>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<StatusCode, ApiError> {
    payload.validate()?;

    let patch = PostPatch {
        title: payload.title,
        body: payload.body,
        published_at: payload.published_at,
        is_published: payload.is_published,
    };
    state.posts.update(patch, post_id, token.as_str()).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE `/posts/{post_key}`
/// Delete a post the caller owns, addressed by its `{post_id}+{created_at}` key.
async fn delete_post<S: PostStore + 'static>(
    State(state): State<AppState<S>>,
    token: BearerToken,
    Path(post_key): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.posts.delete(&post_key, token.as_str()).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST `/posts/{post_id}/attachment`
/// Issue a presigned upload URL for the attachment of a post the caller owns.
async fn request_upload<S: PostStore + 'static>(
    State(state): State<AppState<S>>,
    token: BearerToken,
    Path(post_id): Path<PostId>,
) -> Result<Json<UploadTicket>, ApiError> {
    let ticket = state.posts.request_upload(post_id, token.as_str()).await?;
    Ok(Json(ticket))
}
