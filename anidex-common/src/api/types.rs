//! Shared API response envelope
//!
//! Every endpoint answers with the same shape:
//!
//! ```json
//! { "data": ..., "error": "", "message": "...", "status": 201 }
//! ```
//!
//! `error` is empty on success and `data` is `null` on failure.

use serde::{Deserialize, Serialize};

/// Uniform response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// Payload echoed back to the client (absent on failure)
    pub data: Option<T>,
    /// Failure description, empty on success
    pub error: String,
    /// Human-readable outcome
    pub message: String,
    /// HTTP-style status code mirrored into the body
    pub status: u16,
}

impl<T> ApiResponse<T> {
    /// Successful outcome carrying `data`
    pub fn success(data: T, message: impl Into<String>, status: u16) -> Self {
        Self {
            data: Some(data),
            error: String::new(),
            message: message.into(),
            status,
        }
    }

    /// Failed outcome; the message stays empty and the cause goes in `error`
    pub fn failure(error: impl Into<String>, status: u16) -> Self {
        Self {
            data: None,
            error: error.into(),
            message: String::new(),
            status,
        }
    }
}
