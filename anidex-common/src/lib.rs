//! # Anidex Common Library
//!
//! Shared code for Anidex services including:
//! - Service configuration resolution
//! - Database bootstrap
//! - API response envelope and token verification
//! - Common error type

pub mod api;
pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;

pub use error::{Error, Result};
