//! Attachment types.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a client needs to upload an original image for a post.
///
/// Handed out once and never persisted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// Object key the URL is scoped to.
    pub key: String,
    /// Presigned upload URL.
    pub upload_url: String,
    /// HTTP method to use (PUT).
    pub method: String,
    /// Headers the client must send with the upload.
    pub headers: HashMap<String, String>,
    /// When the URL stops working.
    pub expires_at: DateTime<Utc>,
    /// URL the original will be reachable at once uploaded.
    pub attachment_url: String,
}
