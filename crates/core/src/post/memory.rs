//! In-process `PostStore`.
//!
//! Used for tests and for running the service without a database. Applies the
//! same conditions as the Postgres repository, each under a single lock
//! acquisition so check and write are atomic.

use chrono::{DateTime, Utc};
use quill_shared::{OwnerId, PostId};
use tokio::sync::RwLock;

use super::error::PostError;
use super::store::PostStore;
use super::types::{Post, PostDraft, PostPatch, PostSummary};

/// Posts kept in memory, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryPostStore {
    posts: RwLock<Vec<Post>>,
}

impl MemoryPostStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored posts across all owners.
    pub async fn len(&self) -> usize {
        self.posts.read().await.len()
    }

    /// Whether the store holds no posts.
    pub async fn is_empty(&self) -> bool {
        self.posts.read().await.is_empty()
    }
}

/// Classify a failed condition on `post_id`.
fn condition_failed(posts: &[Post], post_id: PostId) -> PostError {
    if posts.iter().any(|p| p.post_id == post_id) {
        PostError::OwnershipViolation(post_id)
    } else {
        PostError::NotFound(post_id)
    }
}

impl PostStore for MemoryPostStore {
    async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<PostSummary>, PostError> {
        Ok(self
            .posts
            .read()
            .await
            .iter()
            .filter(|p| &p.owner_id == owner)
            .map(Post::summary)
            .collect())
    }

    async fn create(&self, draft: PostDraft, owner: &OwnerId) -> Result<Post, PostError> {
        let post = draft.into_post(owner.clone());
        let mut posts = self.posts.write().await;
        if posts.iter().any(|p| {
            p.post_id == post.post_id
                || (p.owner_id == post.owner_id && p.created_at == post.created_at)
        }) {
            return Err(PostError::storage(format!(
                "duplicate post {}",
                post.key()
            )));
        }
        posts.push(post.clone());
        Ok(post)
    }

    async fn delete(
        &self,
        post_id: PostId,
        created_at: DateTime<Utc>,
        owner: &OwnerId,
    ) -> Result<(), PostError> {
        let mut posts = self.posts.write().await;
        let position = posts.iter().position(|p| {
            &p.owner_id == owner && p.created_at == created_at && p.post_id == post_id
        });

        match position {
            Some(index) => {
                posts.remove(index);
                Ok(())
            }
            None if posts
                .iter()
                .any(|p| p.post_id == post_id && p.created_at == created_at) =>
            {
                Err(PostError::OwnershipViolation(post_id))
            }
            None => Err(PostError::NotFound(post_id)),
        }
    }

    async fn update(
        &self,
        patch: PostPatch,
        post_id: PostId,
        owner: &OwnerId,
    ) -> Result<(), PostError> {
        let mut posts = self.posts.write().await;
        let Some(index) = posts
            .iter()
            .position(|p| p.post_id == post_id && &p.owner_id == owner)
        else {
            return Err(condition_failed(&posts, post_id));
        };

        let post = &mut posts[index];
        post.title = patch.title;
        post.body = patch.body;
        post.published_at = patch.published_at;
        post.is_published = patch.is_published;
        Ok(())
    }

    async fn attach_url(&self, url: &str, post_id: PostId) -> Result<(), PostError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .iter_mut()
            .find(|p| p.post_id == post_id)
            .ok_or(PostError::NotFound(post_id))?;

        post.attachment_url = Some(url.to_string());
        Ok(())
    }

    async fn find_owned(&self, post_id: PostId, owner: &OwnerId) -> Result<Post, PostError> {
        let posts = self.posts.read().await;
        posts
            .iter()
            .find(|p| p.post_id == post_id && &p.owner_id == owner)
            .cloned()
            .ok_or_else(|| condition_failed(&posts, post_id))
    }
}
