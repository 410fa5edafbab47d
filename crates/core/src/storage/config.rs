//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage provider configuration.
///
/// One provider value describes exactly one bucket; the originals and thumbnails
/// buckets each get their own `StorageService`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: AWS S3, Cloudflare R2, MinIO
    S3 {
        /// Endpoint URL; `None` means AWS S3 in `region`.
        endpoint: Option<String>,
        /// S3 bucket name.
        bucket: String,
        /// Access key ID; `None` falls back to the ambient credential chain.
        access_key_id: Option<String>,
        /// Secret access key.
        secret_access_key: Option<String>,
        /// Bucket region.
        region: String,
    },
    /// Local filesystem (development only)
    LocalFs {
        /// Logical bucket name, matched against storage notifications.
        bucket: String,
        /// Root directory path.
        root: PathBuf,
    },
    /// In-process memory (tests only)
    Memory {
        /// Logical bucket name, used for URLs and logging.
        bucket: String,
    },
}

impl StorageProvider {
    /// Create S3-compatible provider with static credentials.
    #[must_use]
    pub fn s3(
        endpoint: Option<String>,
        bucket: impl Into<String>,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self::S3 {
            endpoint,
            bucket: bucket.into(),
            access_key_id: Some(access_key_id.into()),
            secret_access_key: Some(secret_access_key.into()),
            region: region.into(),
        }
    }

    /// Create local filesystem provider (development only).
    #[must_use]
    pub fn local_fs(bucket: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self::LocalFs {
            bucket: bucket.into(),
            root: root.into(),
        }
    }

    /// Create in-memory provider.
    #[must_use]
    pub fn memory(bucket: impl Into<String>) -> Self {
        Self::Memory {
            bucket: bucket.into(),
        }
    }

    /// Get the provider name for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::LocalFs { .. } => "local",
            Self::Memory { .. } => "memory",
        }
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        match self {
            Self::S3 { bucket, .. } | Self::LocalFs { bucket, .. } | Self::Memory { bucket } => {
                bucket
            }
        }
    }
}

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Presigned upload URL TTL in seconds (default: 300 = 5 minutes).
    pub presign_upload_ttl_secs: u64,
    /// Base URL objects are publicly reachable under, if not derivable from the provider.
    pub public_base_url: Option<String>,
}

impl StorageConfig {
    /// Default upload TTL: 5 minutes.
    pub const DEFAULT_UPLOAD_TTL: u64 = 300;

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            presign_upload_ttl_secs: Self::DEFAULT_UPLOAD_TTL,
            public_base_url: None,
        }
    }

    /// Set presigned upload URL TTL.
    #[must_use]
    pub fn with_upload_ttl(mut self, secs: u64) -> Self {
        self.presign_upload_ttl_secs = secs;
        self
    }

    /// Set the public base URL.
    #[must_use]
    pub fn with_public_base_url(mut self, url: impl Into<String>) -> Self {
        self.public_base_url = Some(url.into());
        self
    }
}
