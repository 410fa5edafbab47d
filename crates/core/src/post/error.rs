//! Post operation errors.

use quill_shared::{AppError, JwtError, PostId};
use thiserror::Error;

use super::key::PostKeyError;
use crate::storage::StorageError;

/// Post operation errors.
#[derive(Debug, Error)]
pub enum PostError {
    /// Addressed post does not exist.
    #[error("post not found: {0}")]
    NotFound(PostId),

    /// Addressed post exists but belongs to a different owner.
    #[error("post {0} is owned by another user")]
    OwnershipViolation(PostId),

    /// Caller identity could not be resolved.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Packed composite key could not be decoded.
    #[error("invalid post key: {0}")]
    InvalidKey(#[from] PostKeyError),

    /// A store call failed for environmental reasons (timeout, throttling, lost connection).
    #[error("storage temporarily unavailable: {0}")]
    TransientStorage(String),

    /// A store call failed and retrying will not help.
    #[error("storage error: {0}")]
    Storage(String),
}

impl PostError {
    /// Create a transient storage error.
    #[must_use]
    pub fn transient(msg: impl Into<String>) -> Self {
        Self::TransientStorage(msg.into())
    }

    /// Create a permanent storage error.
    #[must_use]
    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// Whether the invoking infrastructure may retry the operation.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientStorage(_))
    }
}

impl From<JwtError> for PostError {
    fn from(err: JwtError) -> Self {
        Self::InvalidCredential(err.to_string())
    }
}

impl From<StorageError> for PostError {
    fn from(err: StorageError) -> Self {
        if err.is_transient() {
            Self::TransientStorage(err.to_string())
        } else {
            Self::Storage(err.to_string())
        }
    }
}

impl From<PostError> for AppError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::NotFound(_) => Self::NotFound(err.to_string()),
            PostError::OwnershipViolation(_) => Self::Forbidden(err.to_string()),
            PostError::InvalidCredential(_) => Self::Unauthorized(err.to_string()),
            PostError::InvalidKey(_) => Self::Validation(err.to_string()),
            PostError::TransientStorage(_) => Self::ServiceUnavailable(err.to_string()),
            PostError::Storage(_) => Self::Internal(err.to_string()),
        }
    }
}
