//! The persistence contract for posts.

use chrono::{DateTime, Utc};
use quill_shared::{OwnerId, PostId};

use super::error::PostError;
use super::types::{Post, PostDraft, PostPatch, PostSummary};

/// Repository trait for post persistence.
///
/// This trait is implemented by the db crate against Postgres and by
/// [`MemoryPostStore`](super::MemoryPostStore) in-process. Every mutation is a
/// single conditional statement: a failed condition surfaces as
/// `OwnershipViolation` (row exists, different owner) or `NotFound`, never as a
/// silent no-op.
pub trait PostStore: Send + Sync {
    /// All posts of `owner`, in storage order, projected for listing.
    fn list_by_owner(
        &self,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<Vec<PostSummary>, PostError>> + Send;

    /// Persist a new post for `owner`. The owner comes from this argument only.
    fn create(
        &self,
        draft: PostDraft,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<Post, PostError>> + Send;

    /// Delete the post at `(owner, created_at)` whose ID is `post_id`.
    fn delete(
        &self,
        post_id: PostId,
        created_at: DateTime<Utc>,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<(), PostError>> + Send;

    /// Overwrite title, body, and publication state of a post `owner` owns.
    fn update(
        &self,
        patch: PostPatch,
        post_id: PostId,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<(), PostError>> + Send;

    /// Record the attachment URL on a post. No ownership check.
    fn attach_url(
        &self,
        url: &str,
        post_id: PostId,
    ) -> impl std::future::Future<Output = Result<(), PostError>> + Send;

    /// Fetch a post, failing unless `owner` owns it.
    fn find_owned(
        &self,
        post_id: PostId,
        owner: &OwnerId,
    ) -> impl std::future::Future<Output = Result<Post, PostError>> + Send;
}
