//! Thumbnail generation for uploaded originals.
//!
//! An original stored under key `K` in the originals bucket yields a 150 px
//! wide JPEG stored under `K.jpeg` in the thumbnails bucket.

mod error;
mod pipeline;

pub use error::ThumbnailError;
pub use pipeline::{
    DEFAULT_THUMBNAIL_WIDTH, JPEG_QUALITY, RenderedThumbnail, ThumbnailPipeline, render,
    scaled_height, thumbnail_key,
};
