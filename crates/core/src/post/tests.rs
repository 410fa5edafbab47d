//! Service-level tests for post ownership rules, run against the in-memory store.

use std::sync::Arc;

use quill_shared::{JwtConfig, JwtService, OwnerId, PostId};

use super::*;
use crate::attachment::AttachmentService;
use crate::storage::{StorageConfig, StorageProvider, StorageService};

struct Harness {
    service: PostService<MemoryPostStore, JwtService>,
    store: Arc<MemoryPostStore>,
    jwt: Arc<JwtService>,
}

impl Harness {
    fn new(provider: StorageProvider) -> Self {
        let store = Arc::new(MemoryPostStore::new());
        let jwt = Arc::new(JwtService::new(JwtConfig {
            secret: "post-service-test-secret".to_string(),
            access_token_expires_minutes: 15,
        }));
        let originals = Arc::new(
            StorageService::from_config(StorageConfig::new(provider))
                .expect("should create storage"),
        );
        let attachments = Arc::new(AttachmentService::new(originals, Arc::clone(&store)));

        Self {
            service: PostService::new(Arc::clone(&store), Arc::clone(&jwt), attachments),
            store,
            jwt,
        }
    }

    fn token(&self, owner: &str) -> String {
        self.jwt
            .generate_access_token(&OwnerId::from(owner))
            .expect("should sign token")
    }
}

fn harness() -> Harness {
    Harness::new(StorageProvider::memory("originals"))
}

fn hello() -> NewPost {
    NewPost {
        title: "Hello".into(),
        body: "World".into(),
    }
}

fn patch(title: &str) -> PostPatch {
    PostPatch {
        title: title.into(),
        body: "Updated".into(),
        published_at: None,
        is_published: true,
    }
}

#[tokio::test]
async fn test_create_then_list() {
    let h = harness();
    let u1 = h.token("u1");

    let post = h.service.create(hello(), &u1).await.unwrap();

    assert_eq!(post.owner_id, OwnerId::from("u1"));
    assert!(!post.is_published);
    assert!(post.attachment_url.is_none());

    let listed = h.service.list(&u1).await.unwrap();
    assert_eq!(listed, vec![post.summary()]);
}

#[tokio::test]
async fn test_list_is_scoped_to_owner() {
    let h = harness();
    let u1 = h.token("u1");
    let u2 = h.token("u2");

    h.service.create(hello(), &u1).await.unwrap();

    assert!(h.service.list(&u2).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_token_touches_nothing() {
    let h = harness();

    let err = h.service.create(hello(), "not-a-jwt").await.unwrap_err();
    assert!(matches!(err, PostError::InvalidCredential(_)));
    assert!(h.store.is_empty().await);

    let err = h.service.list("").await.unwrap_err();
    assert!(matches!(err, PostError::InvalidCredential(_)));
}

#[tokio::test]
async fn test_update_by_owner_keeps_identity() {
    let h = harness();
    let u1 = h.token("u1");
    let post = h.service.create(hello(), &u1).await.unwrap();

    h.service
        .update(patch("Hello again"), post.post_id, &u1)
        .await
        .unwrap();

    let listed = h.service.list(&u1).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].post_id, post.post_id);
    assert_eq!(listed[0].created_at, post.created_at);
    assert_eq!(listed[0].title, "Hello again");
    assert_eq!(listed[0].body, "Updated");
    assert!(listed[0].is_published);
}

#[tokio::test]
async fn test_update_by_other_owner_is_rejected() {
    let h = harness();
    let u1 = h.token("u1");
    let u2 = h.token("u2");
    let post = h.service.create(hello(), &u1).await.unwrap();

    let err = h
        .service
        .update(patch("Hijacked"), post.post_id, &u2)
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::OwnershipViolation(id) if id == post.post_id));
    let listed = h.service.list(&u1).await.unwrap();
    assert_eq!(listed, vec![post.summary()]);
}

#[tokio::test]
async fn test_update_missing_post() {
    let h = harness();
    let u1 = h.token("u1");
    let missing = PostId::new();

    let err = h
        .service
        .update(patch("Nothing"), missing, &u1)
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound(id) if id == missing));
}

#[tokio::test]
async fn test_delete_then_delete_again() {
    let h = harness();
    let u1 = h.token("u1");
    let post = h.service.create(hello(), &u1).await.unwrap();
    let key = post.key().to_string();

    h.service.delete(&key, &u1).await.unwrap();
    assert!(h.service.list(&u1).await.unwrap().is_empty());

    let err = h.service.delete(&key, &u1).await.unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));
}

#[tokio::test]
async fn test_delete_by_other_owner_is_rejected() {
    let h = harness();
    let u1 = h.token("u1");
    let u2 = h.token("u2");
    let post = h.service.create(hello(), &u1).await.unwrap();

    let err = h
        .service
        .delete(&post.key().to_string(), &u2)
        .await
        .unwrap_err();

    assert!(matches!(err, PostError::OwnershipViolation(_)));
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_delete_with_malformed_key() {
    let h = harness();
    let u1 = h.token("u1");
    h.service.create(hello(), &u1).await.unwrap();

    let err = h.service.delete("no-separator", &u1).await.unwrap_err();
    assert!(matches!(
        err,
        PostError::InvalidKey(PostKeyError::MissingSeparator)
    ));
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_delete_with_wrong_timestamp_is_not_found() {
    let h = harness();
    let u1 = h.token("u1");
    let post = h.service.create(hello(), &u1).await.unwrap();
    let stale = PostKey::new(post.post_id, post.created_at - chrono::Duration::seconds(1));

    let err = h
        .service
        .delete(&stale.to_string(), &u1)
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));
    assert_eq!(h.store.len().await, 1);
}

#[tokio::test]
async fn test_attach_then_list_changes_only_url() {
    let h = harness();
    let u1 = h.token("u1");
    let post = h.service.create(hello(), &u1).await.unwrap();
    let attachments = h.service.attachments();
    let url = attachments.public_url(&post.post_id.to_string());

    attachments.attach_url(&url, post.post_id).await.unwrap();

    let listed = h.service.list(&u1).await.unwrap();
    let mut expected = post.summary();
    expected.attachment_url = Some(url);
    assert_eq!(listed, vec![expected]);
}

#[tokio::test]
async fn test_request_upload_checks_ownership_first() {
    let h = Harness::new(StorageProvider::s3(
        Some("http://localhost:9000".into()),
        "originals",
        "minio",
        "minio-secret",
        "us-east-1",
    ));
    let u1 = h.token("u1");
    let u2 = h.token("u2");
    let post = h.service.create(hello(), &u1).await.unwrap();

    let ticket = h.service.request_upload(post.post_id, &u1).await.unwrap();
    assert_eq!(ticket.key, post.post_id.to_string());
    assert_eq!(ticket.method, "PUT");

    let err = h
        .service
        .request_upload(post.post_id, &u2)
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::OwnershipViolation(_)));

    let err = h
        .service
        .request_upload(PostId::new(), &u1)
        .await
        .unwrap_err();
    assert!(matches!(err, PostError::NotFound(_)));
}
