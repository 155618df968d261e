//! POST /animal: register a new species with its photos
//!
//! The handler only parses the multipart body into a [`SubmissionForm`];
//! everything else is the ingestion pipeline.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Response,
};
use tracing::debug;

use crate::ingest::{IngestionError, SubmissionForm};
use crate::media_store::UploadSource;
use crate::response;
use crate::schema::MEDIA_FIELD;
use crate::AppState;

/// POST /animal
pub async fn create_animal(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let outcome = match multipart {
        Ok(multipart) => match read_form(multipart).await {
            Ok(form) => state.ingestor.submit(form).await,
            Err(e) => Err(e),
        },
        Err(rejection) => Err(IngestionError::Malformed(rejection.body_text())),
    };

    response::encode(outcome)
}

/// Split a multipart body into text values and media files
///
/// Parts with a file name are files; only those under the media field are
/// kept. Parts without a file name are values, repeatable per key.
pub async fn read_form(mut multipart: Multipart) -> Result<SubmissionForm, IngestionError> {
    let mut form = SubmissionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| IngestionError::Malformed(e.body_text()))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        // An empty file name is what browsers send for an unused file input
        match field
            .file_name()
            .filter(|f| !f.is_empty())
            .map(str::to_string)
        {
            Some(filename) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| IngestionError::Malformed(e.body_text()))?;
                if name == MEDIA_FIELD {
                    debug!(file = %filename, bytes = bytes.len(), "Received media part");
                    form.files.push(UploadSource::from_bytes(filename, bytes));
                } else {
                    debug!(field = %name, file = %filename, "Ignoring file outside media field");
                }
            }
            None => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| IngestionError::Malformed(e.body_text()))?;
                form.values.entry(name).or_default().push(value);
            }
        }
    }

    Ok(form)
}
