//! Response encoder
//!
//! Renders submission outcomes into the shared [`ApiResponse`] envelope. The
//! HTTP status line always matches the `status` member of the body. If the
//! envelope itself cannot be serialized the client gets a plain-text 500.

use crate::ingest::IngestionError;
use crate::record::SubmissionRecord;
use anidex_common::api::ApiResponse;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use tracing::error;

/// Message sent with a committed submission
pub const CREATED_MESSAGE: &str = "New animal species successfully registered in the Anidex";

/// Encode the outcome of a submission
pub fn encode(outcome: Result<SubmissionRecord, IngestionError>) -> Response {
    match outcome {
        Ok(record) => encode_envelope(&ApiResponse::success(
            record,
            CREATED_MESSAGE,
            StatusCode::CREATED.as_u16(),
        )),
        Err(e) => encode_error(e.status_code(), &e.to_string()),
    }
}

/// Error envelope with an explicit status
pub fn encode_error(status: StatusCode, message: &str) -> Response {
    encode_envelope(&ApiResponse::<SubmissionRecord>::failure(
        message,
        status.as_u16(),
    ))
}

/// Serialize any envelope; the HTTP status is taken from `envelope.status`
pub fn encode_envelope<T: Serialize>(envelope: &ApiResponse<T>) -> Response {
    let status =
        StatusCode::from_u16(envelope.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    match serde_json::to_vec(envelope) {
        Ok(body) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response(),
        Err(e) => {
            error!("Failed to serialize response envelope: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
