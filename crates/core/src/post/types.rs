//! Post types and data structures.

use chrono::{DateTime, SubsecRound, Utc};
use quill_shared::{OwnerId, PostId};
use serde::{Deserialize, Serialize};

use super::key::PostKey;

/// A stored post, including the owner it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    /// Post ID.
    pub post_id: PostId,
    /// Owner that created the post.
    pub owner_id: OwnerId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Publication timestamp, set by update.
    pub published_at: Option<DateTime<Utc>>,
    /// Whether the post is published.
    pub is_published: bool,
    /// URL of the uploaded original image, if any.
    pub attachment_url: Option<String>,
}

impl Post {
    /// Project the post onto the fields returned by listings.
    #[must_use]
    pub fn summary(&self) -> PostSummary {
        PostSummary {
            post_id: self.post_id,
            created_at: self.created_at,
            title: self.title.clone(),
            body: self.body.clone(),
            published_at: self.published_at,
            is_published: self.is_published,
            attachment_url: self.attachment_url.clone(),
        }
    }

    /// Composite key addressing this post for deletion.
    #[must_use]
    pub fn key(&self) -> PostKey {
        PostKey::new(self.post_id, self.created_at)
    }
}

/// Listing projection of a post. The owner is implied by the query and not repeated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    /// Post ID.
    pub post_id: PostId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Whether the post is published.
    pub is_published: bool,
    /// URL of the uploaded original image, if any.
    pub attachment_url: Option<String>,
}

/// Client input for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewPost {
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
}

/// Everything about a new post except its owner.
///
/// Built by `PostService::create`; the store adds the owner resolved from the
/// caller's credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    /// Freshly assigned post ID.
    pub post_id: PostId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Publication timestamp.
    pub published_at: Option<DateTime<Utc>>,
    /// Whether the post is published.
    pub is_published: bool,
    /// Attachment URL.
    pub attachment_url: Option<String>,
}

impl PostDraft {
    /// Draft for a brand-new post: fresh ID, current time, unpublished, no attachment.
    #[must_use]
    pub fn new(input: NewPost) -> Self {
        Self {
            post_id: PostId::new(),
            created_at: creation_timestamp(),
            title: input.title,
            body: input.body,
            published_at: None,
            is_published: false,
            attachment_url: None,
        }
    }

    /// Attach the owner, producing the record to persist.
    #[must_use]
    pub fn into_post(self, owner: OwnerId) -> Post {
        Post {
            post_id: self.post_id,
            owner_id: owner,
            created_at: self.created_at,
            title: self.title,
            body: self.body,
            published_at: self.published_at,
            is_published: self.is_published,
            attachment_url: self.attachment_url,
        }
    }
}

/// Fields the general update path may change.
///
/// `attachment_url` is deliberately absent: only attachment binding sets it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPatch {
    /// New title.
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

/// Current time truncated to the precision the database keeps (microseconds),
/// so a creation timestamp read back from storage compares equal to the one
/// handed out in the composite key.
#[must_use]
pub fn creation_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
