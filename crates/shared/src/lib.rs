//! Shared types, errors, and configuration for Quill.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for posts and owners
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and the identity resolver used to turn a bearer token into an owner

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

#[cfg(test)]
mod jwt_tests;

pub use auth::{Claims, IdentityResolver};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::{OwnerId, PostId};
