//! Core business logic for Quill.
//!
//! This crate contains the post persistence contract and the media-attachment
//! pipeline with ZERO web or database dependencies.
//!
//! # Modules
//!
//! - `post` - Post model, the ownership-enforcing `PostStore` contract, and `PostService`
//! - `storage` - Object storage on top of Apache OpenDAL
//! - `attachment` - Presigned upload URLs and attachment binding
//! - `thumbnail` - Image resize pipeline for uploaded originals
//! - `events` - Object-created notifications and the handler that reacts to them

pub mod attachment;
pub mod events;
pub mod post;
pub mod storage;
pub mod thumbnail;
