//! Attachment uploads.
//!
//! This module provides:
//! - Presigned, single-key upload URLs into the originals bucket
//! - Binding the uploaded original's URL to its post

mod service;
mod types;

pub use service::AttachmentService;
pub use types::UploadTicket;
