//! Post orchestration.

use std::sync::Arc;

use quill_shared::{IdentityResolver, OwnerId, PostId};
use tracing::{debug, info};

use super::error::PostError;
use super::key::PostKey;
use super::store::PostStore;
use super::types::{NewPost, Post, PostDraft, PostPatch, PostSummary};
use crate::attachment::{AttachmentService, UploadTicket};

/// Entry point for every post operation made on behalf of a caller.
///
/// Each call resolves the owner from the caller's credential before touching
/// storage. The owner is never taken from request input.
pub struct PostService<S: PostStore, R: IdentityResolver> {
    store: Arc<S>,
    identity: Arc<R>,
    attachments: Arc<AttachmentService<S>>,
}

impl<S: PostStore, R: IdentityResolver> PostService<S, R> {
    /// Create a new post service.
    #[must_use]
    pub fn new(
        store: Arc<S>,
        identity: Arc<R>,
        attachments: Arc<AttachmentService<S>>,
    ) -> Self {
        Self {
            store,
            identity,
            attachments,
        }
    }

    fn resolve(&self, token: &str) -> Result<OwnerId, PostError> {
        Ok(self.identity.resolve_owner(token)?)
    }

    /// All posts of the caller.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredential` or a storage error.
    pub async fn list(&self, token: &str) -> Result<Vec<PostSummary>, PostError> {
        let owner = self.resolve(token)?;
        let posts = self.store.list_by_owner(&owner).await?;
        debug!(owner_id = %owner, count = posts.len(), "Listed posts");
        Ok(posts)
    }

    /// Create a post owned by the caller.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredential` or a storage error.
    pub async fn create(&self, input: NewPost, token: &str) -> Result<Post, PostError> {
        let owner = self.resolve(token)?;
        let post = self.store.create(PostDraft::new(input), &owner).await?;
        info!(post_id = %post.post_id, owner_id = %owner, "Post created");
        Ok(post)
    }

    /// Overwrite title, body, and publication state of a post the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredential`, `NotFound`, `OwnershipViolation`, or a storage error.
    pub async fn update(
        &self,
        patch: PostPatch,
        post_id: PostId,
        token: &str,
    ) -> Result<(), PostError> {
        let owner = self.resolve(token)?;
        self.store.update(patch, post_id, &owner).await?;
        info!(post_id = %post_id, owner_id = %owner, "Post updated");
        Ok(())
    }

    /// Delete a post the caller owns, addressed by its packed key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredential`, `InvalidKey`, `NotFound`,
    /// `OwnershipViolation`, or a storage error.
    pub async fn delete(&self, post_key: &str, token: &str) -> Result<(), PostError> {
        let owner = self.resolve(token)?;
        let key: PostKey = post_key.parse()?;
        self.store.delete(key.post_id, key.created_at, &owner).await?;
        info!(post_id = %key.post_id, owner_id = %owner, "Post deleted");
        Ok(())
    }

    /// Issue an upload URL for the attachment of a post the caller owns.
    ///
    /// # Errors
    ///
    /// Returns `InvalidCredential`, `NotFound`, `OwnershipViolation`, or a storage error.
    pub async fn request_upload(
        &self,
        post_id: PostId,
        token: &str,
    ) -> Result<UploadTicket, PostError> {
        let owner = self.resolve(token)?;
        self.store.find_owned(post_id, &owner).await?;
        let ticket = self.attachments.issue_upload_url(post_id).await?;
        info!(post_id = %post_id, owner_id = %owner, "Upload URL issued");
        Ok(ticket)
    }

    /// The attachment service this post service issues upload URLs through.
    #[must_use]
    pub fn attachments(&self) -> &Arc<AttachmentService<S>> {
        &self.attachments
    }
}
