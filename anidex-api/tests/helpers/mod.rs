//! Test Helper Utilities
//!
//! Shared utilities for testing anidex-api: complete form values, a
//! multipart body builder, in-memory repositories and failing collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use anidex_api::db::{AnimalRepository, PersistenceError, SqliteAnimalRepository};
use anidex_api::ingest::Ingestor;
use anidex_api::media_store::MediaStore;
use anidex_api::record::SubmissionRecord;
use anidex_common::config::{NamingPolicy, StageOrder};
use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tokio::io::{AsyncRead, ReadBuf};

pub const BOUNDARY: &str = "anidex-test-boundary";

/// Every schema field with one plausible value
pub fn complete_values() -> HashMap<String, Vec<String>> {
    [
        ("name", vec!["Orca"]),
        ("taxonomy", vec!["Orcinus orca"]),
        ("etymology", vec!["Latin orca, a kind of whale"]),
        ("iucn[]", vec!["DD"]),
        ("geo", vec!["All oceans"]),
        ("migration", vec!["Follows prey"]),
        ("habitat", vec!["Marine"]),
        ("dimensions", vec!["6-8 m, up to 6 t"]),
        ("ds", vec!["Diurnal"]),
        ("diet", vec!["Fish, seals"]),
        ("description", vec!["Largest member of the dolphin family"]),
        ("category", vec!["mammal"]),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
    .collect()
}

/// Builds a `multipart/form-data` body by hand
#[derive(Default)]
pub struct MultipartBuilder {
    body: Vec<u8>,
}

impl MultipartBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder pre-filled with [`complete_values`], minus `skip`
    pub fn with_values(skip: &[&str]) -> Self {
        let mut values: Vec<_> = complete_values().into_iter().collect();
        values.sort();

        let mut builder = Self::new();
        for (key, vals) in values {
            if skip.contains(&key.as_str()) {
                continue;
            }
            for v in vals {
                builder = builder.text(&key, &v);
            }
        }
        builder
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, filename: &str, content: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, filename
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(content);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
        self.body
    }

    pub fn content_type() -> String {
        format!("multipart/form-data; boundary={}", BOUNDARY)
    }
}

/// In-memory database with the catalog schema
///
/// Single connection so every query sees the same database.
pub async fn create_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");
    anidex_common::db::create_schema(&pool)
        .await
        .expect("Should create schema");
    pool
}

/// Ingestor over an in-memory database and `upload_dir`
pub async fn create_test_ingestor(
    upload_dir: &Path,
    naming: NamingPolicy,
    order: StageOrder,
) -> (Ingestor, SqlitePool) {
    let pool = create_test_pool().await;
    let ingestor = Ingestor::new(
        MediaStore::new(upload_dir, naming),
        Arc::new(SqliteAnimalRepository::new(pool.clone())),
        order,
    );
    (ingestor, pool)
}

pub async fn count_animals(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM animals")
        .fetch_one(pool)
        .await
        .expect("Should count animals")
}

/// Number of entries in a directory (0 if it does not exist)
pub fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|d| d.count()).unwrap_or(0)
}

/// Repository whose store is always unreachable
pub struct UnreachableRepository;

#[async_trait]
impl AnimalRepository for UnreachableRepository {
    async fn insert(&self, _record: &SubmissionRecord) -> Result<i64, PersistenceError> {
        Err(PersistenceError("database is unreachable".to_string()))
    }
}

/// Reader that yields a few bytes and then fails, simulating a broken stream
pub struct FailingReader {
    sent: bool,
}

impl FailingReader {
    pub fn new() -> Self {
        Self { sent: false }
    }
}

impl AsyncRead for FailingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if !self.sent {
            self.sent = true;
            buf.put_slice(b"partial");
            return Poll::Ready(Ok(()));
        }
        Poll::Ready(Err(io::Error::new(io::ErrorKind::Other, "simulated write failure")))
    }
}
