//! Typed target of a catalog submission

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Separator used for every multi-valued member, including the media paths
pub const LIST_SEPARATOR: &str = ",";

/// One species entry as it is validated, stored and echoed back
///
/// Every member is an opaque string; the core does no format checking.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    /// Comma-joined stored media paths (derived, never submitted)
    pub photo: String,
    pub category: String,
    pub name: String,
    pub taxonomy: String,
    pub etymology: String,
    /// Conservation status, comma-joined when several were submitted
    pub iucn: String,
    pub geo: String,
    pub migration: String,
    pub habitat: String,
    pub dimensions: String,
    /// Diet schedule
    pub ds: String,
    pub diet: String,
    pub description: String,
}

impl SubmissionRecord {
    /// Join stored paths into the media member, preserving order
    pub fn set_photo_paths<P: AsRef<Path>>(&mut self, paths: &[P]) {
        self.photo = paths
            .iter()
            .map(|p| p.as_ref().display().to_string())
            .collect::<Vec<_>>()
            .join(LIST_SEPARATOR);
    }

    /// Stored paths recorded in the media member
    pub fn photo_paths(&self) -> Vec<&str> {
        if self.photo.is_empty() {
            return Vec::new();
        }
        self.photo.split(LIST_SEPARATOR).collect()
    }
}
