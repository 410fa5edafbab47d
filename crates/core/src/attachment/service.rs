//! Attachment service implementation.

use std::sync::Arc;

use quill_shared::PostId;
use tracing::{debug, info};

use super::types::UploadTicket;
use crate::post::{PostError, PostStore};
use crate::storage::StorageService;

/// Issues upload URLs into the originals bucket and records attachment URLs on posts.
///
/// Ownership is not checked here. Callers that act on behalf of a user
/// (`PostService::request_upload`) verify it before calling in.
pub struct AttachmentService<S: PostStore> {
    originals: Arc<StorageService>,
    store: Arc<S>,
}

impl<S: PostStore> AttachmentService<S> {
    /// Create a new attachment service.
    #[must_use]
    pub fn new(originals: Arc<StorageService>, store: Arc<S>) -> Self {
        Self { originals, store }
    }

    /// Issue a time-limited PUT URL for the object whose key is the post ID.
    ///
    /// The URL is scoped to that single key and expires after the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the backend cannot presign.
    pub async fn issue_upload_url(&self, post_id: PostId) -> Result<UploadTicket, PostError> {
        let key = post_id.to_string();
        let presigned = self.originals.presign_upload(&key).await?;

        debug!(
            post_id = %post_id,
            bucket = %self.originals.bucket(),
            expires_at = %presigned.expires_at,
            "Issued upload URL"
        );

        Ok(UploadTicket {
            attachment_url: self.originals.public_url(&key),
            key,
            upload_url: presigned.url,
            method: presigned.method,
            headers: presigned.headers,
            expires_at: presigned.expires_at,
        })
    }

    /// Record `url` as the attachment of `post_id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the post does not exist, or a storage error.
    pub async fn attach_url(&self, url: &str, post_id: PostId) -> Result<(), PostError> {
        self.store.attach_url(url, post_id).await?;
        info!(post_id = %post_id, url = %url, "Attachment bound");
        Ok(())
    }

    /// Where an object in the originals bucket can be fetched from.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        self.originals.public_url(key)
    }
}
