//! Reacts to object-created events for the originals bucket.

use std::sync::Arc;

use quill_shared::PostId;
use tracing::{debug, error, warn};

use super::notification::ObjectCreated;
use crate::attachment::AttachmentService;
use crate::post::{PostError, PostStore};
use crate::thumbnail::{ThumbnailError, ThumbnailPipeline};

/// What handling one event did.
#[derive(Debug)]
pub struct EventReport {
    /// Attachment binding result; `None` when the key does not name a post or
    /// the original could not be read.
    pub attachment: Option<Result<(), PostError>>,
    /// Thumbnail result: the thumbnail key on success.
    pub thumbnail: Result<String, ThumbnailError>,
}

impl EventReport {
    /// Whether every step succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.thumbnail.is_ok() && !matches!(self.attachment, Some(Err(_)))
    }

    /// Whether delivering the same event again may complete the failed steps.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        let attachment = matches!(&self.attachment, Some(Err(e)) if e.is_retryable());
        let thumbnail = matches!(&self.thumbnail, Err(e) if e.is_retryable());
        attachment || thumbnail
    }
}

/// Binds attachment URLs and renders thumbnails for newly uploaded originals.
///
/// Handling is idempotent, so the notifier may deliver an event any number of
/// times.
pub struct UploadHandler<S: PostStore> {
    attachments: Arc<AttachmentService<S>>,
    pipeline: ThumbnailPipeline,
}

impl<S: PostStore> UploadHandler<S> {
    /// Create a new handler.
    #[must_use]
    pub fn new(attachments: Arc<AttachmentService<S>>, pipeline: ThumbnailPipeline) -> Self {
        Self {
            attachments,
            pipeline,
        }
    }

    /// Bucket whose events this handler acts on.
    #[must_use]
    pub fn originals_bucket(&self) -> &str {
        self.pipeline.originals_bucket()
    }

    /// Handle a single event. Returns `None` for events outside the originals bucket.
    ///
    /// The original is read first; nothing is bound or rendered unless it
    /// exists. After that, attachment binding and thumbnail rendering are
    /// independent: a failure in one does not skip the other.
    pub async fn handle(&self, event: &ObjectCreated) -> Option<EventReport> {
        if event.bucket != self.originals_bucket() {
            debug!(bucket = %event.bucket, key = %event.key, "Ignoring event for other bucket");
            return None;
        }

        let original = match self.pipeline.fetch(&event.key).await {
            Ok(bytes) => bytes,
            Err(e) => {
                log_failure(&event.key, &e, e.is_retryable(), "Original unavailable");
                return Some(EventReport {
                    attachment: None,
                    thumbnail: Err(e),
                });
            }
        };

        let attachment = match event.key.parse::<PostId>() {
            Ok(post_id) => Some(self.bind(post_id, &event.key).await),
            Err(_) => {
                debug!(key = %event.key, "Key does not name a post, skipping attachment");
                None
            }
        };

        let thumbnail = self.pipeline.store(&event.key, original).await;
        if let Err(e) = &thumbnail {
            log_failure(&event.key, e, e.is_retryable(), "Thumbnail failed");
        }

        Some(EventReport {
            attachment,
            thumbnail,
        })
    }

    async fn bind(&self, post_id: PostId, key: &str) -> Result<(), PostError> {
        let url = self.attachments.public_url(key);
        let result = self.attachments.attach_url(&url, post_id).await;

        if let Err(e) = &result {
            log_failure(key, e, e.is_retryable(), "Attachment binding failed");
        }
        result
    }
}

fn log_failure(key: &str, err: &dyn std::error::Error, retryable: bool, message: &str) {
    if retryable {
        warn!(key = %key, error = %err, retryable, "{message}");
    } else {
        error!(key = %key, error = %err, retryable, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use chrono::{DateTime, Utc};
    use image::{DynamicImage, ImageFormat, RgbImage};
    use quill_shared::OwnerId;

    use super::*;
    use crate::post::{MemoryPostStore, NewPost, Post, PostDraft, PostPatch, PostSummary};
    use crate::storage::{StorageConfig, StorageError, StorageProvider, StorageService};

    /// Memory store whose attachment writes fail as if the database timed out.
    #[derive(Default)]
    struct TimeoutOnAttach(MemoryPostStore);

    impl PostStore for TimeoutOnAttach {
        async fn list_by_owner(&self, owner: &OwnerId) -> Result<Vec<PostSummary>, PostError> {
            self.0.list_by_owner(owner).await
        }

        async fn create(&self, draft: PostDraft, owner: &OwnerId) -> Result<Post, PostError> {
            self.0.create(draft, owner).await
        }

        async fn delete(
            &self,
            post_id: PostId,
            created_at: DateTime<Utc>,
            owner: &OwnerId,
        ) -> Result<(), PostError> {
            self.0.delete(post_id, created_at, owner).await
        }

        async fn update(
            &self,
            patch: PostPatch,
            post_id: PostId,
            owner: &OwnerId,
        ) -> Result<(), PostError> {
            self.0.update(patch, post_id, owner).await
        }

        async fn attach_url(&self, _url: &str, _post_id: PostId) -> Result<(), PostError> {
            Err(PostError::transient("statement timeout"))
        }

        async fn find_owned(&self, post_id: PostId, owner: &OwnerId) -> Result<Post, PostError> {
            self.0.find_owned(post_id, owner).await
        }
    }

    struct Fixture<S: PostStore> {
        handler: UploadHandler<S>,
        store: Arc<S>,
        originals: Arc<StorageService>,
        thumbnails: Arc<StorageService>,
    }

    fn memory(bucket: &str) -> Arc<StorageService> {
        Arc::new(
            StorageService::from_config(StorageConfig::new(StorageProvider::memory(bucket)))
                .expect("should create storage"),
        )
    }

    fn fixture_with<S: PostStore>(store: S, originals: Arc<StorageService>) -> Fixture<S> {
        let store = Arc::new(store);
        let thumbnails = memory("thumbnails");
        let attachments = Arc::new(AttachmentService::new(
            Arc::clone(&originals),
            Arc::clone(&store),
        ));
        let pipeline = ThumbnailPipeline::new(Arc::clone(&originals), Arc::clone(&thumbnails));

        Fixture {
            handler: UploadHandler::new(attachments, pipeline),
            store,
            originals,
            thumbnails,
        }
    }

    fn fixture() -> Fixture<MemoryPostStore> {
        fixture_with(MemoryPostStore::new(), memory("originals"))
    }

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("should encode fixture");
        bytes
    }

    async fn create_post<S: PostStore>(store: &S, owner: &OwnerId) -> PostId {
        store
            .create(
                PostDraft::new(NewPost {
                    title: "Hello".into(),
                    body: "World".into(),
                }),
                owner,
            )
            .await
            .unwrap()
            .post_id
    }

    #[tokio::test]
    async fn test_upload_binds_url_and_renders_thumbnail() {
        let f = fixture();
        let owner = OwnerId::from("u1");
        let post_id = create_post(f.store.as_ref(), &owner).await;
        let key = post_id.to_string();
        f.originals.write(&key, png(300, 200)).await.unwrap();

        let report = f
            .handler
            .handle(&ObjectCreated::new("originals", key.clone()))
            .await
            .unwrap();

        assert!(report.is_success());
        assert!(matches!(report.attachment, Some(Ok(()))));
        assert_eq!(report.thumbnail.unwrap(), format!("{key}.jpeg"));
        assert!(f.thumbnails.exists(&format!("{key}.jpeg")).await.unwrap());

        let post = f.store.find_owned(post_id, &owner).await.unwrap();
        assert_eq!(
            post.attachment_url,
            Some(format!("memory://originals/{key}"))
        );
    }

    #[tokio::test]
    async fn test_non_image_upload_still_binds_url() {
        let f = fixture();
        let owner = OwnerId::from("u1");
        let post_id = create_post(f.store.as_ref(), &owner).await;
        let key = post_id.to_string();
        f.originals.write(&key, b"%PDF-1.7".to_vec()).await.unwrap();

        let report = f
            .handler
            .handle(&ObjectCreated::new("originals", key.clone()))
            .await
            .unwrap();

        assert!(matches!(report.attachment, Some(Ok(()))));
        assert!(matches!(
            report.thumbnail,
            Err(ThumbnailError::UnsupportedMedia(_))
        ));
        assert!(!report.is_retryable());
        assert!(!f.thumbnails.exists(&format!("{key}.jpeg")).await.unwrap());
    }

    #[tokio::test]
    async fn test_event_without_stored_original_binds_nothing() {
        let f = fixture();
        let owner = OwnerId::from("u1");
        let post_id = create_post(f.store.as_ref(), &owner).await;

        let report = f
            .handler
            .handle(&ObjectCreated::new("originals", post_id.to_string()))
            .await
            .unwrap();

        assert!(report.attachment.is_none());
        assert!(matches!(
            report.thumbnail,
            Err(ThumbnailError::Storage(StorageError::NotFound { .. }))
        ));
        assert!(!report.is_retryable());
        let post = f.store.find_owned(post_id, &owner).await.unwrap();
        assert!(post.attachment_url.is_none());
    }

    #[tokio::test]
    async fn test_key_without_post_only_renders() {
        let f = fixture();
        f.originals.write("banner.png", png(600, 150)).await.unwrap();

        let report = f
            .handler
            .handle(&ObjectCreated::new("originals", "banner.png"))
            .await
            .unwrap();

        assert!(report.attachment.is_none());
        assert_eq!(report.thumbnail.unwrap(), "banner.png.jpeg");
    }

    #[tokio::test]
    async fn test_upload_for_deleted_post_reports_not_found() {
        let f = fixture();
        let post_id = PostId::new();
        let key = post_id.to_string();
        f.originals.write(&key, png(150, 150)).await.unwrap();

        let report = f
            .handler
            .handle(&ObjectCreated::new("originals", key))
            .await
            .unwrap();

        assert!(matches!(report.attachment, Some(Err(PostError::NotFound(id))) if id == post_id));
        assert!(report.thumbnail.is_ok());
        assert!(!report.is_success());
        assert!(!report.is_retryable());
    }

    #[tokio::test]
    async fn test_transient_binding_failure_is_retryable() {
        let f = fixture_with(TimeoutOnAttach::default(), memory("originals"));
        let owner = OwnerId::from("u1");
        let post_id = create_post(f.store.as_ref(), &owner).await;
        let key = post_id.to_string();
        f.originals.write(&key, png(300, 300)).await.unwrap();

        let report = f
            .handler
            .handle(&ObjectCreated::new("originals", key.clone()))
            .await
            .unwrap();

        assert!(matches!(report.attachment, Some(Err(PostError::TransientStorage(_)))));
        assert!(report.is_retryable());
        assert!(f.thumbnails.exists(&format!("{key}.jpeg")).await.unwrap());
    }

    #[tokio::test]
    async fn test_other_bucket_is_ignored() {
        let f = fixture();

        let report = f
            .handler
            .handle(&ObjectCreated::new("thumbnails", "abc.jpeg"))
            .await;

        assert!(report.is_none());
    }

    #[tokio::test]
    async fn test_filesystem_originals_match_by_bucket_name() {
        let root = std::env::temp_dir().join(format!("quill-originals-{}", uuid::Uuid::new_v4()));
        let originals = Arc::new(
            StorageService::from_config(StorageConfig::new(StorageProvider::local_fs(
                "quill-originals",
                &root,
            )))
            .expect("should create storage"),
        );
        let f = fixture_with(MemoryPostStore::new(), originals);
        f.originals.write("banner.png", png(300, 100)).await.unwrap();

        let report = f
            .handler
            .handle(&ObjectCreated::new("quill-originals", "banner.png"))
            .await;

        assert_eq!(report.unwrap().thumbnail.unwrap(), "banner.png.jpeg");
        let _ = std::fs::remove_dir_all(root);
    }
}
