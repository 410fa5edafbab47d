//! Posts and their ownership rules.
//!
//! # Modules
//!
//! - `types` - Post record, listing projection, create/update inputs
//! - `key` - The packed `{post_id}+{created_at}` composite key
//! - `error` - Post-specific error types
//! - `store` - The `PostStore` persistence contract
//! - `memory` - In-process `PostStore`
//! - `service` - `PostService`, which resolves the caller and enforces ownership

pub mod error;
pub mod key;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::PostError;
pub use key::{KEY_SEPARATOR, PostKey, PostKeyError};
pub use memory::MemoryPostStore;
pub use service::PostService;
pub use store::PostStore;
pub use types::{NewPost, Post, PostDraft, PostPatch, PostSummary, creation_timestamp};
