//! The packed composite key used to address a post for deletion.
//!
//! Format: `{post_id}+{created_at}` with `created_at` in RFC 3339 (UTC, `Z`
//! suffix, microseconds). Only the first `+` separates the halves.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use quill_shared::PostId;
use thiserror::Error;

/// Separator between the two halves of a packed key.
pub const KEY_SEPARATOR: char = '+';

/// Two-part post address: ID plus creation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PostKey {
    /// Post ID.
    pub post_id: PostId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Reasons a packed key fails to decode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PostKeyError {
    /// No `+` separator.
    #[error("missing '+' separator")]
    MissingSeparator,

    /// First half is not a post ID.
    #[error("invalid post id '{0}'")]
    InvalidPostId(String),

    /// Second half is not an RFC 3339 timestamp.
    #[error("invalid creation timestamp '{0}'")]
    InvalidTimestamp(String),
}

impl PostKey {
    /// Create a key from its parts.
    #[must_use]
    pub const fn new(post_id: PostId, created_at: DateTime<Utc>) -> Self {
        Self {
            post_id,
            created_at,
        }
    }
}

impl fmt::Display for PostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_SEPARATOR}{}",
            self.post_id,
            self.created_at.to_rfc3339_opts(SecondsFormat::Micros, true)
        )
    }
}

impl FromStr for PostKey {
    type Err = PostKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (id, created_at) = s
            .split_once(KEY_SEPARATOR)
            .ok_or(PostKeyError::MissingSeparator)?;

        let post_id = PostId::from_str(id).map_err(|_| PostKeyError::InvalidPostId(id.into()))?;
        let created_at = DateTime::parse_from_rfc3339(created_at)
            .map_err(|_| PostKeyError::InvalidTimestamp(created_at.into()))?
            .with_timezone(&Utc);

        Ok(Self {
            post_id,
            created_at,
        })
    }
}
