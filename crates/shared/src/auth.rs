//! Authentication types: JWT claims and the identity-resolution seam.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jwt::JwtError;
use crate::types::OwnerId;

/// JWT claims for access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (owner identity).
    pub sub: String,
    /// Issued at timestamp.
    pub iat: i64,
    /// Expiration timestamp.
    pub exp: i64,
}

impl Claims {
    /// Creates new claims for an owner.
    #[must_use]
    pub fn new(owner: &OwnerId, expires_at: DateTime<Utc>) -> Self {
        let now = Utc::now();
        Self {
            sub: owner.as_str().to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        }
    }

    /// Returns the owner identity carried by these claims.
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.sub.clone())
    }
}

/// Resolves the caller's identity from an opaque credential token.
///
/// The core never trusts an owner identifier supplied by the client; every
/// operation derives it through this trait.
pub trait IdentityResolver: Send + Sync {
    /// Resolve the owner the token was issued to.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is malformed, expired, or fails verification.
    fn resolve_owner(&self, token: &str) -> Result<OwnerId, JwtError>;
}
