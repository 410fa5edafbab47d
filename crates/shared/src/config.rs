//! Application configuration management.
//!
//! Configuration is loaded once at process start and handed to each component's
//! constructor; nothing below the binary reads the environment directly.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// JWT configuration.
    pub jwt: JwtConfig,
    /// Object storage configuration.
    pub storage: StorageSettings,
    /// Storage event intake configuration.
    pub events: EventsConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Name of the table holding posts.
    #[serde(default = "default_posts_table")]
    pub posts_table: String,
    /// Run pending migrations on startup.
    #[serde(default = "default_run_migrations")]
    pub run_migrations: bool,
}

fn default_posts_table() -> String {
    "posts".to_string()
}

fn default_run_migrations() -> bool {
    true
}

/// JWT configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    /// Secret key for verifying tokens.
    pub secret: String,
    /// Access token expiration in seconds.
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry_secs: u64,
}

fn default_access_token_expiry() -> u64 {
    900 // 15 minutes
}

/// Which object store implementation backs the buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// S3-compatible service.
    #[default]
    S3,
    /// Local filesystem, one directory per bucket under `root`.
    Fs,
    /// In-process memory (tests and demos).
    Memory,
}

/// Object storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Storage backend.
    #[serde(default)]
    pub provider: StorageBackend,
    /// Storage region.
    #[serde(default = "default_region")]
    pub region: String,
    /// Endpoint URL (S3-compatible services other than AWS).
    pub endpoint: Option<String>,
    /// Access key ID.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
    /// Bucket receiving original uploads.
    pub originals_bucket: String,
    /// Bucket receiving generated thumbnails.
    pub thumbnails_bucket: String,
    /// Lifetime of presigned upload URLs, in seconds.
    #[serde(default = "default_signed_url_expiration")]
    pub signed_url_expiration_secs: u64,
    /// Public base URL for originals, used when recording attachment URLs.
    pub public_base_url: Option<String>,
    /// Root directory for the `fs` backend.
    pub root: Option<String>,
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_signed_url_expiration() -> u64 {
    300 // 5 minutes
}

/// Storage event intake configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    /// Shared token the object store sends as `Authorization: Bearer <token>`.
    pub webhook_token: String,
    /// Notifications handled at once; further deliveries get 503 and are redelivered.
    #[serde(default = "default_max_in_flight")]
    pub max_in_flight: usize,
}

fn default_max_in_flight() -> usize {
    8
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("QUILL")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
