//! Object-created notifications and the handler that reacts to them.
//!
//! The HTTP adapter turns storage notifications into [`ObjectCreated`] events
//! and runs each through an [`UploadHandler`] before acknowledging the
//! delivery, so a failed event is redelivered by the notifier.

mod handler;
mod notification;

pub use handler::{EventReport, UploadHandler};
pub use notification::{EventError, ObjectCreated, parse_s3_notification};
