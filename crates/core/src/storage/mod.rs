//! Object storage on top of Apache OpenDAL.
//!
//! Each `StorageService` wraps one bucket. Quill uses two: the originals bucket
//! that clients upload into through presigned URLs, and the thumbnails bucket the
//! resize pipeline writes to.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ op.presign_write("key", duration)  │
//! │ op.read("key")             │ op.stat("key")                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod service;

pub use config::{StorageConfig, StorageProvider};
pub use error::StorageError;
pub use service::{PresignedUrl, StorageService};
