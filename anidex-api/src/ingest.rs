//! Ingestion orchestrator
//!
//! Runs one submission through media storage, field mapping and the insert,
//! sequentially, inside the task handling the request:
//!
//! ```text
//! Start -> UploadingMedia -> {UploadFailed | Validating}
//!       -> {ValidationFailed | Persisting} -> {PersistenceFailed | Committed}
//! ```
//!
//! With [`StageOrder::ValidateFirst`] (default) the two middle stages swap, so a
//! rejected payload never writes media. [`StageOrder::UploadFirst`] keeps the
//! legacy order: a validation failure after a successful upload leaves that
//! request's files on disk. Neither order removes files when the insert
//! fails. Every failure is terminal; nothing is retried.

use crate::db::{AnimalRepository, PersistenceError};
use crate::mapper::{self, MappingError, RawValues};
use crate::media_store::{MediaStore, StorageError, UploadSource};
use crate::record::SubmissionRecord;
use anidex_common::config::StageOrder;
use axum::http::StatusCode;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// A parsed multipart submission
#[derive(Debug, Default)]
pub struct SubmissionForm {
    /// Non-file values keyed by field name
    pub values: RawValues,
    /// Files sent under the media field, in arrival order
    pub files: Vec<UploadSource>,
}

/// Where a submission ended up (or is)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionState {
    Start,
    UploadingMedia,
    Validating,
    Persisting,
    UploadFailed,
    ValidationFailed,
    PersistenceFailed,
    Committed,
}

impl fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubmissionState::Start => "start",
            SubmissionState::UploadingMedia => "uploading_media",
            SubmissionState::Validating => "validating",
            SubmissionState::Persisting => "persisting",
            SubmissionState::UploadFailed => "upload_failed",
            SubmissionState::ValidationFailed => "validation_failed",
            SubmissionState::PersistenceFailed => "persistence_failed",
            SubmissionState::Committed => "committed",
        };
        f.write_str(name)
    }
}

/// Why a submission was not committed
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Request body is not a readable multipart form
    #[error("Malformed multipart request: {0}")]
    Malformed(String),

    #[error(transparent)]
    Upload(#[from] StorageError),

    #[error(transparent)]
    Validation(#[from] MappingError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl IngestionError {
    /// Status carried by the error envelope
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestionError::Malformed(_)
            | IngestionError::Upload(_)
            | IngestionError::Validation(_) => StatusCode::BAD_REQUEST,
            IngestionError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Terminal state reached by the failing submission
    pub fn state(&self) -> SubmissionState {
        match self {
            IngestionError::Malformed(_) | IngestionError::Validation(_) => {
                SubmissionState::ValidationFailed
            }
            IngestionError::Upload(_) => SubmissionState::UploadFailed,
            IngestionError::Persistence(_) => SubmissionState::PersistenceFailed,
        }
    }
}

/// Composes media storage, mapping and persistence into one submission
pub struct Ingestor {
    media: MediaStore,
    repository: Arc<dyn AnimalRepository>,
    order: StageOrder,
}

impl Ingestor {
    pub fn new(media: MediaStore, repository: Arc<dyn AnimalRepository>, order: StageOrder) -> Self {
        Self {
            media,
            repository,
            order,
        }
    }

    /// Run one submission to a terminal state
    pub async fn submit(&self, form: SubmissionForm) -> Result<SubmissionRecord, IngestionError> {
        let SubmissionForm { values, files } = form;
        debug!(state = %SubmissionState::Start, files = files.len(), order = %self.order, "Submission received");

        let record = match self.order {
            StageOrder::ValidateFirst => {
                let mut record = self.validate(&values)?;
                let paths = self.upload(files).await?;
                record.set_photo_paths(&paths);
                record
            }
            StageOrder::UploadFirst => {
                let paths = self.upload(files).await?;
                let mut record = self.validate(&values).map_err(|e| {
                    warn!(
                        orphaned = paths.len(),
                        "Validation failed after upload; stored files are kept"
                    );
                    e
                })?;
                record.set_photo_paths(&paths);
                record
            }
        };

        debug!(state = %SubmissionState::Persisting, "Inserting record");
        let id = self.repository.insert(&record).await.map_err(|e| {
            warn!(state = %SubmissionState::PersistenceFailed, "Insert failed: {}", e);
            IngestionError::from(e)
        })?;

        info!(
            state = %SubmissionState::Committed,
            id,
            name = %record.name,
            photos = record.photo_paths().len(),
            "New animal registered"
        );
        Ok(record)
    }

    async fn upload(
        &self,
        files: Vec<UploadSource>,
    ) -> Result<Vec<std::path::PathBuf>, IngestionError> {
        debug!(state = %SubmissionState::UploadingMedia, count = files.len());
        let result = self.media.store(files).await.map_err(|e| {
            warn!(state = %SubmissionState::UploadFailed, "{}", e);
            IngestionError::from(e)
        })?;
        Ok(result.paths)
    }

    fn validate(&self, values: &RawValues) -> Result<SubmissionRecord, IngestionError> {
        debug!(state = %SubmissionState::Validating);
        mapper::map(values).map_err(|e| {
            warn!(state = %SubmissionState::ValidationFailed, "{}", e);
            IngestionError::from(e)
        })
    }
}
