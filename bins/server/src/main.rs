//! Quill API Server
//!
//! Main entry point: HTTP API, including the storage-notification intake that
//! binds attachments and renders thumbnails.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quill_api::{AppState, create_router};
use quill_core::attachment::AttachmentService;
use quill_core::events::UploadHandler;
use quill_core::post::PostService;
use quill_core::storage::{StorageConfig, StorageError, StorageProvider, StorageService};
use quill_core::thumbnail::ThumbnailPipeline;
use quill_db::migration::{Migrator, MigratorTrait};
use quill_db::{PostRepository, connect};
use quill_shared::config::{StorageBackend, StorageSettings};
use quill_shared::{AppConfig, JwtConfig, JwtService};

/// Root directory for the `fs` backend when none is configured.
const DEFAULT_FS_ROOT: &str = "./data";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect(&config.database.url).await?;
    info!("Connected to database");

    let store = Arc::new(PostRepository::with_table(
        db.clone(),
        config.database.posts_table.clone(),
    ));

    if config.database.run_migrations {
        Migrator::up(&db, None).await?;
        store.ensure_schema().await?;
        info!(table = %store.table(), "Migrations applied");
    }

    // Object storage
    let originals = Arc::new(storage_for(
        &config.storage,
        &config.storage.originals_bucket,
        config.storage.public_base_url.as_deref(),
    )?);
    let thumbnails = Arc::new(storage_for(
        &config.storage,
        &config.storage.thumbnails_bucket,
        None,
    )?);
    info!(
        provider = %originals.provider_name(),
        originals = %originals.bucket(),
        thumbnails = %thumbnails.bucket(),
        "Object storage configured"
    );

    // Identity
    let jwt_service = Arc::new(JwtService::new(JwtConfig {
        secret: config.jwt.secret.clone(),
        access_token_expires_minutes: i64::try_from(config.jwt.access_token_expiry_secs / 60)
            .unwrap_or(i64::MAX),
    }));

    // Services
    let attachments = Arc::new(AttachmentService::new(
        Arc::clone(&originals),
        Arc::clone(&store),
    ));
    let posts = Arc::new(PostService::new(
        store,
        jwt_service,
        Arc::clone(&attachments),
    ));

    // Storage notifications
    let uploads = Arc::new(UploadHandler::new(
        attachments,
        ThumbnailPipeline::new(originals, thumbnails),
    ));

    // Create router
    let app = create_router(AppState::new(
        posts,
        uploads,
        config.events.webhook_token.as_str(),
        config.events.max_in_flight,
    ));

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");

    Ok(())
}

/// Build the storage service for one bucket from the shared storage settings.
fn storage_for(
    settings: &StorageSettings,
    bucket: &str,
    public_base_url: Option<&str>,
) -> Result<StorageService, StorageError> {
    let provider = match settings.provider {
        StorageBackend::S3 => StorageProvider::S3 {
            endpoint: settings.endpoint.clone(),
            bucket: bucket.to_string(),
            access_key_id: settings.access_key_id.clone(),
            secret_access_key: settings.secret_access_key.clone(),
            region: settings.region.clone(),
        },
        StorageBackend::Fs => {
            let root = settings
                .root
                .as_deref()
                .map_or_else(|| PathBuf::from(DEFAULT_FS_ROOT), PathBuf::from);
            StorageProvider::local_fs(bucket, root.join(bucket))
        }
        StorageBackend::Memory => StorageProvider::memory(bucket),
    };

    let mut config =
        StorageConfig::new(provider).with_upload_ttl(settings.signed_url_expiration_secs);
    if let Some(base) = public_base_url {
        config = config.with_public_base_url(base);
    }
    StorageService::from_config(config)
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
