//! Media store: all-or-nothing persistence of a submission's files
//!
//! Files land in one flat upload directory. A batch either stores every file
//! or leaves none of its files behind: on the first failure the store stops,
//! removes whatever it already wrote for the batch and reports the failure.
//!
//! There is no cross-request locking. With [`NamingPolicy::OriginalName`] two
//! concurrent uploads of the same file name race and the last writer wins.

use crate::record::LIST_SEPARATOR;
use anidex_common::config::NamingPolicy;
use axum::body::Bytes;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// One uploaded file awaiting storage
pub struct UploadSource {
    /// File name as sent by the client (untrusted)
    pub filename: String,
    pub reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadSource {
    pub fn new(filename: impl Into<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            filename: filename.into(),
            reader: Box::new(reader),
        }
    }

    /// Source backed by an already-buffered multipart part
    pub fn from_bytes(filename: impl Into<String>, bytes: Bytes) -> Self {
        Self::new(filename, io::Cursor::new(bytes))
    }
}

impl std::fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadSource")
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

/// Paths of a fully stored batch, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResult {
    pub paths: Vec<PathBuf>,
    pub succeeded_count: usize,
}

/// Media persistence errors
#[derive(Debug, Error)]
pub enum StorageError {
    /// Upload directory could not be created
    #[error("The upload of photos produced an error: cannot create {}: {source}", path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A file in the batch failed; nothing from the batch remains stored
    /// unless `reason` also reports a cleanup failure
    #[error("The upload of photos produced an error: {file}: {reason}")]
    PartialUpload { file: String, reason: String },
}

/// Writes uploaded media into a single configured directory
#[derive(Debug, Clone)]
pub struct MediaStore {
    upload_dir: PathBuf,
    naming: NamingPolicy,
}

impl MediaStore {
    pub fn new(upload_dir: impl Into<PathBuf>, naming: NamingPolicy) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            naming,
        }
    }

    /// Create the upload directory if needed
    ///
    /// Safe under concurrent first use: an existing directory is success.
    pub async fn ensure_dir(&self) -> Result<(), StorageError> {
        fs::create_dir_all(&self.upload_dir)
            .await
            .map_err(|source| StorageError::Directory {
                path: self.upload_dir.clone(),
                source,
            })
    }

    /// Store every file of a batch, or none of them
    pub async fn store(&self, files: Vec<UploadSource>) -> Result<UploadResult, StorageError> {
        if files.is_empty() {
            return Ok(UploadResult {
                paths: Vec::new(),
                succeeded_count: 0,
            });
        }

        self.ensure_dir().await?;

        let total = files.len();
        let mut written: Vec<PathBuf> = Vec::with_capacity(total);

        for mut source in files {
            let result = match self.destination(&source.filename) {
                Some(dest) => self.write_one(&dest, &mut source, &mut written).await,
                None => Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "file name has no usable base name",
                )),
            };

            if let Err(e) = result {
                warn!(
                    file = %source.filename,
                    stored = written.len(),
                    total,
                    "Upload failed, rolling back batch: {}",
                    e
                );

                let mut reason = e.to_string();
                let leftovers = self.discard(&written).await;
                if !leftovers.is_empty() {
                    let detail = leftovers
                        .iter()
                        .map(|(path, err)| format!("{}: {}", path.display(), err))
                        .collect::<Vec<_>>()
                        .join("; ");
                    reason = format!("{} (cleanup failed: {})", reason, detail);
                }

                return Err(StorageError::PartialUpload {
                    file: source.filename,
                    reason,
                });
            }
        }

        info!(count = written.len(), dir = %self.upload_dir.display(), "Stored uploaded media");

        Ok(UploadResult {
            succeeded_count: written.len(),
            paths: written,
        })
    }

    /// Remove stored files, returning the ones that could not be removed
    ///
    /// Files that are already gone count as removed.
    pub async fn discard(&self, paths: &[PathBuf]) -> Vec<(PathBuf, io::Error)> {
        let mut failures = Vec::new();
        for path in paths {
            match fs::remove_file(path).await {
                Ok(()) => debug!(path = %path.display(), "Removed stored media"),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => {
                    warn!(path = %path.display(), "Could not remove stored media: {}", e);
                    failures.push((path.clone(), e));
                }
            }
        }
        failures
    }

    /// Destination path for a client file name under the naming policy
    ///
    /// `None` when the name has no usable base name.
    pub fn destination(&self, original: &str) -> Option<PathBuf> {
        let base = sanitize_filename(original)?;

        let stored_name = match self.naming {
            NamingPolicy::OriginalName => base,
            NamingPolicy::Unique => match Path::new(&base)
                .extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
            {
                Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
                None => Uuid::new_v4().to_string(),
            },
        };

        Some(self.upload_dir.join(stored_name))
    }

    async fn write_one(
        &self,
        dest: &Path,
        source: &mut UploadSource,
        written: &mut Vec<PathBuf>,
    ) -> io::Result<()> {
        let mut file = fs::File::create(dest).await?;
        // Tracked before copying so a partially written file is rolled back too
        written.push(dest.to_path_buf());

        let bytes = tokio::io::copy(&mut source.reader, &mut file).await?;
        file.flush().await?;

        debug!(file = %source.filename, dest = %dest.display(), bytes, "Stored file");
        Ok(())
    }
}

/// Reduce a client file name to its final path segment
///
/// Both `/` and `\` count as separators so traversal written for either
/// platform is stripped. The list separator is replaced with `_` so stored
/// paths can be joined into the media member and split back unchanged.
/// Returns `None` for names without a usable segment (empty, `.` or `..`).
pub fn sanitize_filename(original: &str) -> Option<String> {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();

    match base {
        "" | "." | ".." => None,
        name => Some(name.replace(LIST_SEPARATOR, "_")),
    }
}
