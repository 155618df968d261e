//! Persistence collaborator for catalog entries
//!
//! The ingestion pipeline only needs one operation: insert a finished record.
//! Storage failures surface as an opaque message.

use crate::record::SubmissionRecord;
use async_trait::async_trait;
use thiserror::Error;

mod animals;
pub use animals::SqliteAnimalRepository;

/// Downstream store rejected the record or was unreachable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PersistenceError(pub String);

impl From<sqlx::Error> for PersistenceError {
    fn from(e: sqlx::Error) -> Self {
        PersistenceError(e.to_string())
    }
}

/// Insert-only access to the animals table
#[async_trait]
pub trait AnimalRepository: Send + Sync {
    /// Persist `record`, returning the new row id
    async fn insert(&self, record: &SubmissionRecord) -> Result<i64, PersistenceError>;
}
