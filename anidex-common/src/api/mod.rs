//! API types and authentication shared across Anidex services
//!
//! Framework-agnostic: HTTP wiring (Axum extractors, middleware) lives in
//! the service crates.

pub mod auth;
pub mod types;

pub use auth::{issue_token, verify_token, ApiAuthError, Claims};
pub use types::ApiResponse;
