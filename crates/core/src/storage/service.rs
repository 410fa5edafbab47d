//! Storage service implementation using Apache OpenDAL.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use opendal::{ErrorKind, Operator, services};

use super::config::{StorageConfig, StorageProvider};
use super::error::StorageError;

/// Presigned URL for upload.
#[derive(Debug, Clone)]
pub struct PresignedUrl {
    /// The presigned URL.
    pub url: String,
    /// HTTP method to use (PUT for upload).
    pub method: String,
    /// When the URL expires.
    pub expires_at: DateTime<Utc>,
    /// Headers the client must send with the request.
    pub headers: HashMap<String, String>,
}

/// Object storage for one bucket.
#[derive(Debug, Clone)]
pub struct StorageService {
    operator: Operator,
    config: StorageConfig,
}

impl StorageService {
    /// Create a new storage service from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage provider cannot be initialized.
    pub fn from_config(config: StorageConfig) -> Result<Self, StorageError> {
        let operator = Self::create_operator(&config.provider)?;
        Ok(Self { operator, config })
    }

    /// Create OpenDAL operator from provider config.
    fn create_operator(provider: &StorageProvider) -> Result<Operator, StorageError> {
        match provider {
            StorageProvider::S3 {
                endpoint,
                bucket,
                access_key_id,
                secret_access_key,
                region,
            } => {
                let mut builder = services::S3::default().bucket(bucket).region(region);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint(endpoint);
                }
                if let (Some(key_id), Some(secret)) = (access_key_id, secret_access_key) {
                    builder = builder
                        .access_key_id(key_id)
                        .secret_access_key(secret)
                        .disable_config_load()
                        .disable_ec2_metadata();
                }

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::LocalFs { root, .. } => {
                let builder = services::Fs::default().root(
                    root.to_str()
                        .ok_or_else(|| StorageError::configuration("invalid path"))?,
                );

                Ok(Operator::new(builder)
                    .map_err(|e| StorageError::configuration(e.to_string()))?
                    .finish())
            }
            StorageProvider::Memory { .. } => Ok(Operator::new(services::Memory::default())
                .map_err(|e| StorageError::configuration(e.to_string()))?
                .finish()),
        }
    }

    /// Generate a presigned, write-only URL for exactly one key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or presigning is not supported or fails.
    pub async fn presign_upload(&self, key: &str) -> Result<PresignedUrl, StorageError> {
        validate_key(key)?;
        let ttl = Duration::from_secs(self.config.presign_upload_ttl_secs);

        let presigned = self
            .operator
            .presign_write(key, ttl)
            .await
            .map_err(|e| StorageError::from_opendal(key, &e))?;

        let headers = presigned
            .header()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(PresignedUrl {
            url: presigned.uri().to_string(),
            method: presigned.method().to_string(),
            expires_at: Utc::now()
                + chrono::Duration::seconds(
                    i64::try_from(self.config.presign_upload_ttl_secs).unwrap_or(i64::MAX),
                ),
            headers,
        })
    }

    /// Read the full content of an object.
    ///
    /// # Errors
    ///
    /// Returns an error if the object does not exist or cannot be read.
    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        validate_key(key)?;
        let buffer = self
            .operator
            .read(key)
            .await
            .map_err(|e| StorageError::from_opendal(key, &e))?;
        Ok(buffer.to_vec())
    }

    /// Write an object, replacing any existing content under the key.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        validate_key(key)?;
        self.operator
            .write(key, bytes)
            .await
            .map(|_| ())
            .map_err(|e| StorageError::from_opendal(key, &e))
    }

    /// Check if an object exists in storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot answer; a missing object is `Ok(false)`.
    pub async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        validate_key(key)?;
        match self.operator.stat(key).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::from_opendal(key, &e)),
        }
    }

    /// Externally reachable URL of an object.
    #[must_use]
    pub fn public_url(&self, key: &str) -> String {
        if let Some(base) = &self.config.public_base_url {
            return format!("{}/{key}", base.trim_end_matches('/'));
        }

        match &self.config.provider {
            StorageProvider::S3 {
                endpoint: Some(endpoint),
                bucket,
                ..
            } => format!("{}/{bucket}/{key}", endpoint.trim_end_matches('/')),
            StorageProvider::S3 {
                endpoint: None,
                bucket,
                region,
                ..
            } => format!("https://{bucket}.s3.{region}.amazonaws.com/{key}"),
            StorageProvider::LocalFs { root, .. } => {
                format!("file://{}/{key}", root.display())
            }
            StorageProvider::Memory { bucket } => format!("memory://{bucket}/{key}"),
        }
    }

    /// Get the storage provider name.
    #[must_use]
    pub fn provider_name(&self) -> &'static str {
        self.config.provider.name()
    }

    /// Get the bucket name.
    #[must_use]
    pub fn bucket(&self) -> &str {
        self.config.provider.bucket()
    }

    /// Get the configuration.
    #[must_use]
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }
}

/// Reject keys that would escape the bucket root or address a directory.
fn validate_key(key: &str) -> Result<(), StorageError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.ends_with('/')
        || key.split('/').any(|segment| segment == "..")
    {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_service(bucket: &str) -> StorageService {
        StorageService::from_config(StorageConfig::new(StorageProvider::memory(bucket)))
            .expect("should create service")
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("0190f3a2-0000-7000-8000-000000000000").is_ok());
        assert!(validate_key("nested/key.png").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/absolute").is_err());
        assert!(validate_key("dir/").is_err());
        assert!(validate_key("../escape").is_err());
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let storage = memory_service("originals");

        storage.write("abc", b"hello".to_vec()).await.unwrap();

        assert_eq!(storage.read("abc").await.unwrap(), b"hello".to_vec());
        assert!(storage.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let storage = memory_service("originals");

        let err = storage.read("missing").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { ref key } if key == "missing"));
        assert!(!storage.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_write_overwrites() {
        let storage = memory_service("thumbnails");

        storage.write("k", b"first".to_vec()).await.unwrap();
        storage.write("k", b"second".to_vec()).await.unwrap();

        assert_eq!(storage.read("k").await.unwrap(), b"second".to_vec());
    }

    #[tokio::test]
    async fn test_memory_buckets_are_isolated() {
        let originals = memory_service("originals");
        let thumbnails = memory_service("thumbnails");

        originals.write("k", b"data".to_vec()).await.unwrap();

        assert!(!thumbnails.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_presign_not_supported_by_memory() {
        let storage = memory_service("originals");

        let err = storage.presign_upload("abc").await.unwrap_err();
        assert!(matches!(err, StorageError::PresignNotSupported));
    }

    #[tokio::test]
    async fn test_presign_upload_s3_is_scoped_to_key() {
        let config = StorageConfig::new(StorageProvider::s3(
            Some("http://localhost:9000".to_string()),
            "originals",
            "test-access-key",
            "test-secret-key",
            "us-east-1",
        ))
        .with_upload_ttl(120);
        let storage = StorageService::from_config(config).expect("should create service");

        let presigned = storage.presign_upload("post-123").await.unwrap();

        assert_eq!(presigned.method, "PUT");
        assert!(presigned.url.contains("post-123"));
        assert!(presigned.url.contains("X-Amz-Expires=120"));
        assert!(presigned.expires_at > Utc::now());
        assert!(presigned.expires_at <= Utc::now() + chrono::Duration::seconds(121));
    }

    #[test]
    fn test_public_url_variants() {
        let aws = StorageService::from_config(StorageConfig::new(StorageProvider::S3 {
            endpoint: None,
            bucket: "originals".into(),
            access_key_id: Some("id".into()),
            secret_access_key: Some("secret".into()),
            region: "eu-west-1".into(),
        }))
        .unwrap();
        assert_eq!(
            aws.public_url("abc"),
            "https://originals.s3.eu-west-1.amazonaws.com/abc"
        );

        let minio = StorageService::from_config(StorageConfig::new(StorageProvider::s3(
            Some("http://localhost:9000/".to_string()),
            "originals",
            "id",
            "secret",
            "us-east-1",
        )))
        .unwrap();
        assert_eq!(minio.public_url("abc"), "http://localhost:9000/originals/abc");

        let cdn = StorageService::from_config(
            StorageConfig::new(StorageProvider::memory("originals"))
                .with_public_base_url("https://cdn.example.com/"),
        )
        .unwrap();
        assert_eq!(cdn.public_url("abc"), "https://cdn.example.com/abc");

        assert_eq!(
            memory_service("originals").public_url("abc"),
            "memory://originals/abc"
        );
    }
}
