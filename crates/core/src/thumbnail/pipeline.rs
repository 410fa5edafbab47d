//! Resize originals into JPEG thumbnails.

use std::sync::Arc;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info};

use super::error::ThumbnailError;
use crate::storage::StorageService;

/// Width every thumbnail is scaled to.
pub const DEFAULT_THUMBNAIL_WIDTH: u32 = 150;

/// JPEG quality used for thumbnails.
pub const JPEG_QUALITY: u8 = 85;

/// Key of the thumbnail derived from the original stored under `key`.
#[must_use]
pub fn thumbnail_key(key: &str) -> String {
    format!("{key}.jpeg")
}

/// Height that keeps the aspect ratio of a `width` x `height` image scaled to
/// `target_width`, rounded to the nearest pixel and never less than 1.
#[must_use]
pub fn scaled_height(width: u32, height: u32, target_width: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let width = u64::from(width);
    let scaled = (u64::from(height) * u64::from(target_width) + width / 2) / width;
    u32::try_from(scaled.max(1)).unwrap_or(u32::MAX)
}

/// An encoded thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedThumbnail {
    /// JPEG bytes.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Decode `original`, scale it to `target_width`, and encode it as an opaque JPEG.
///
/// # Errors
///
/// Returns `UnsupportedMedia` if the bytes are not a decodable image, or
/// `Encode` if JPEG encoding fails.
pub fn render(original: &[u8], target_width: u32) -> Result<RenderedThumbnail, ThumbnailError> {
    let image = image::load_from_memory(original)
        .map_err(|e| ThumbnailError::UnsupportedMedia(e.to_string()))?;

    let (width, height) = image.dimensions();
    let resized = if width == target_width {
        image
    } else {
        let target_height = scaled_height(width, height, target_width);
        image.resize_exact(target_width, target_height, FilterType::Triangle)
    };

    // JPEG has no alpha channel.
    let opaque = DynamicImage::ImageRgb8(resized.to_rgb8());
    let (width, height) = opaque.dimensions();

    let mut bytes = Vec::new();
    opaque
        .write_with_encoder(JpegEncoder::new_with_quality(&mut bytes, JPEG_QUALITY))
        .map_err(|e| ThumbnailError::Encode(e.to_string()))?;

    Ok(RenderedThumbnail {
        bytes,
        width,
        height,
    })
}

/// Reads originals from one bucket and writes thumbnails to another.
#[derive(Debug, Clone)]
pub struct ThumbnailPipeline {
    originals: Arc<StorageService>,
    thumbnails: Arc<StorageService>,
    target_width: u32,
}

impl ThumbnailPipeline {
    /// Create a pipeline producing thumbnails of the default width.
    #[must_use]
    pub fn new(originals: Arc<StorageService>, thumbnails: Arc<StorageService>) -> Self {
        Self {
            originals,
            thumbnails,
            target_width: DEFAULT_THUMBNAIL_WIDTH,
        }
    }

    /// Bucket the pipeline reads originals from.
    #[must_use]
    pub fn originals_bucket(&self) -> &str {
        self.originals.bucket()
    }

    /// Bucket the pipeline writes thumbnails to.
    #[must_use]
    pub fn thumbnails_bucket(&self) -> &str {
        self.thumbnails.bucket()
    }

    /// Produce the thumbnail for the original stored under `key`.
    ///
    /// Running it twice for the same key overwrites the same thumbnail. On
    /// failure nothing is written.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the original cannot be read or the thumbnail
    /// cannot be written, `UnsupportedMedia` if the original is not an image,
    /// or `Encode` if encoding fails.
    pub async fn process(&self, key: &str) -> Result<String, ThumbnailError> {
        let original = self.fetch(key).await?;
        self.store(key, original).await
    }

    /// Read the original stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns `Storage(NotFound)` if no such object exists, or another
    /// storage error if the read fails.
    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, ThumbnailError> {
        let original = self.originals.read(key).await?;
        debug!(key = %key, size = original.len(), "Original fetched");
        Ok(original)
    }

    /// Render already-fetched `original` bytes and write the thumbnail for `key`.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedMedia`, `Encode`, or a storage error from the write.
    pub async fn store(&self, key: &str, original: Vec<u8>) -> Result<String, ThumbnailError> {
        let target_width = self.target_width;
        let rendered = tokio::task::spawn_blocking(move || render(&original, target_width))
            .await
            .map_err(|e| ThumbnailError::Encode(e.to_string()))??;

        let output_key = thumbnail_key(key);
        let size = rendered.bytes.len();
        self.thumbnails.write(&output_key, rendered.bytes).await?;

        info!(
            key = %key,
            thumbnail_key = %output_key,
            width = rendered.width,
            height = rendered.height,
            size,
            "Thumbnail written"
        );
        Ok(output_key)
    }
}
