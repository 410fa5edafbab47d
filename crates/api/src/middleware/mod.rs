//! Request middleware.

pub mod auth;
pub mod webhook;

pub use auth::{BearerToken, bearer_auth};
pub use webhook::webhook_auth;
