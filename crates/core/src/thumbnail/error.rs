//! Thumbnail pipeline errors.

use quill_shared::AppError;
use thiserror::Error;

use crate::storage::StorageError;

/// Thumbnail pipeline errors.
#[derive(Debug, Error)]
pub enum ThumbnailError {
    /// The original could not be decoded as an image.
    #[error("unsupported media: {0}")]
    UnsupportedMedia(String),

    /// The resized image could not be encoded as JPEG.
    #[error("thumbnail encoding failed: {0}")]
    Encode(String),

    /// Reading the original or writing the thumbnail failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ThumbnailError {
    /// Whether running the pipeline again for the same key may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Storage(err) => err.is_transient(),
            Self::UnsupportedMedia(_) | Self::Encode(_) => false,
        }
    }
}

impl From<ThumbnailError> for AppError {
    fn from(err: ThumbnailError) -> Self {
        match &err {
            ThumbnailError::UnsupportedMedia(_) => Self::UnsupportedMedia(err.to_string()),
            ThumbnailError::Storage(StorageError::NotFound { .. }) => {
                Self::NotFound(err.to_string())
            }
            ThumbnailError::Storage(storage) if storage.is_transient() => {
                Self::ServiceUnavailable(err.to_string())
            }
            ThumbnailError::Storage(_) | ThumbnailError::Encode(_) => {
                Self::Internal(err.to_string())
            }
        }
    }
}
