//! Integration tests for the ingestion pipeline
//!
//! Tests cover:
//! - Committed submissions: media paths joined in input order, row inserted
//! - Missing mandatory fields under both stage orders (file side effects)
//! - Mid-batch upload failure leaves no files and no row
//! - Persistence failure keeps stored files (no cross-stage cleanup)
//! - Multi-valued fields and the media-path round trip

mod helpers;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anidex_api::ingest::{IngestionError, Ingestor, SubmissionForm};
use anidex_api::mapper::MappingError;
use anidex_api::media_store::{MediaStore, StorageError, UploadSource};
use anidex_common::config::{NamingPolicy, StageOrder};
use axum::body::Bytes;
use helpers::*;
use sqlx::Row;
use tempfile::TempDir;

fn photo(name: &str, content: &'static [u8]) -> UploadSource {
    UploadSource::from_bytes(name, Bytes::from_static(content))
}

fn form(files: Vec<UploadSource>) -> SubmissionForm {
    SubmissionForm {
        values: complete_values(),
        files,
    }
}

// =============================================================================
// Committed submissions
// =============================================================================

#[tokio::test]
async fn test_commit_joins_paths_in_input_order() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("uploaded_images");
    let (ingestor, pool) =
        create_test_ingestor(&dir, NamingPolicy::OriginalName, StageOrder::ValidateFirst).await;

    let record = ingestor
        .submit(form(vec![
            photo("fileA.jpg", b"aaa"),
            photo("fileB.jpg", b"bbb"),
        ]))
        .await
        .unwrap();

    let expected = format!(
        "{},{}",
        dir.join("fileA.jpg").display(),
        dir.join("fileB.jpg").display()
    );
    assert_eq!(record.photo, expected);

    let row = sqlx::query("SELECT photos, name, taxonomy FROM animals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(row.get::<String, _>("photos"), expected);
    assert_eq!(row.get::<String, _>("name"), "Orca");
    assert_eq!(row.get::<String, _>("taxonomy"), "Orcinus orca");
}

#[tokio::test]
async fn test_unique_naming_yields_distinct_existing_paths() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("uploaded_images");
    let (ingestor, _pool) =
        create_test_ingestor(&dir, NamingPolicy::Unique, StageOrder::ValidateFirst).await;

    // Same client file name three times: nothing is overwritten
    let record = ingestor
        .submit(form(vec![
            photo("orca.jpg", b"one"),
            photo("orca.jpg", b"two"),
            photo("orca.jpg", b"three"),
        ]))
        .await
        .unwrap();

    let paths = record.photo_paths();
    assert_eq!(paths.len(), 3);
    assert_eq!(paths.iter().collect::<HashSet<_>>().len(), 3);
    assert_eq!(std::fs::read(paths[0]).unwrap(), b"one");
    assert_eq!(std::fs::read(paths[2]).unwrap(), b"three");
    for p in &paths {
        assert!(p.ends_with(".jpg"));
    }
}

#[tokio::test]
async fn test_media_field_round_trips_to_upload_paths() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("uploaded_images");
    let store = MediaStore::new(&dir, NamingPolicy::Unique);

    let result = store
        .store(vec![photo("a.png", b"a"), photo("b.png", b"b")])
        .await
        .unwrap();

    let mut record = anidex_api::record::SubmissionRecord::default();
    record.set_photo_paths(&result.paths);

    let split: Vec<PathBuf> = record.photo_paths().into_iter().map(PathBuf::from).collect();
    assert_eq!(split, result.paths);
    assert_eq!(result.succeeded_count, result.paths.len());
}

#[tokio::test]
async fn test_comma_in_file_name_round_trips_to_upload_paths() {
    for naming in [NamingPolicy::Unique, NamingPolicy::OriginalName] {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("uploaded_images");
        let store = MediaStore::new(&dir, naming);

        let result = store
            .store(vec![photo("orca.jp,g", b"a"), photo("orca, pod.jpg", b"b")])
            .await
            .unwrap();

        let mut record = anidex_api::record::SubmissionRecord::default();
        record.set_photo_paths(&result.paths);

        let split: Vec<PathBuf> = record.photo_paths().into_iter().map(PathBuf::from).collect();
        assert_eq!(split, result.paths, "naming policy {}", naming);
        for path in &result.paths {
            assert!(path.exists());
        }
    }
}

#[tokio::test]
async fn test_multi_valued_conservation_status() {
    let temp = TempDir::new().unwrap();
    let (ingestor, pool) =
        create_test_ingestor(temp.path(), NamingPolicy::Unique, StageOrder::ValidateFirst).await;

    let mut submission = form(Vec::new());
    submission
        .values
        .insert("iucn[]".to_string(), vec!["EN".to_string(), "CR".to_string()]);

    let record = ingestor.submit(submission).await.unwrap();
    assert_eq!(record.iucn, "EN,CR");
    assert_eq!(record.photo, "");

    let iucn: String = sqlx::query_scalar("SELECT iucn FROM animals")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(iucn, "EN,CR");
}

// =============================================================================
// Missing mandatory fields
// =============================================================================

#[tokio::test]
async fn test_validate_first_rejection_writes_nothing() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("uploaded_images");
    let (ingestor, pool) =
        create_test_ingestor(&dir, NamingPolicy::OriginalName, StageOrder::ValidateFirst).await;

    let mut submission = form(vec![photo("fileA.jpg", b"aaa")]);
    submission.values.remove("taxonomy");

    let err = ingestor.submit(submission).await.unwrap_err();

    assert!(matches!(
        err,
        IngestionError::Validation(MappingError::MissingField { ref name }) if name == "taxonomy"
    ));
    assert_eq!(count_files(&dir), 0);
    assert_eq!(count_animals(&pool).await, 0);
}

#[tokio::test]
async fn test_upload_first_rejection_leaves_uploaded_files() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("uploaded_images");
    let (ingestor, pool) =
        create_test_ingestor(&dir, NamingPolicy::OriginalName, StageOrder::UploadFirst).await;

    let mut submission = form(vec![photo("fileA.jpg", b"aaa"), photo("fileB.jpg", b"bbb")]);
    submission.values.remove("taxonomy");

    let err = ingestor.submit(submission).await.unwrap_err();

    assert_eq!(err.to_string(), "taxonomy is not present in provided data");
    // Legacy order: the files were stored before validation ran
    assert!(dir.join("fileA.jpg").exists());
    assert!(dir.join("fileB.jpg").exists());
    assert_eq!(count_animals(&pool).await, 0);
}

#[tokio::test]
async fn test_missing_description_is_accepted() {
    let temp = TempDir::new().unwrap();
    let (ingestor, pool) =
        create_test_ingestor(temp.path(), NamingPolicy::Unique, StageOrder::ValidateFirst).await;

    let mut submission = form(Vec::new());
    submission.values.remove("description");

    let record = ingestor.submit(submission).await.unwrap();
    assert_eq!(record.description, "");
    assert_eq!(count_animals(&pool).await, 1);
}

// =============================================================================
// Upload failures
// =============================================================================

#[tokio::test]
async fn test_mid_batch_failure_leaves_no_files_and_no_row() {
    for order in [StageOrder::ValidateFirst, StageOrder::UploadFirst] {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("uploaded_images");
        let (ingestor, pool) = create_test_ingestor(&dir, NamingPolicy::OriginalName, order).await;

        let err = ingestor
            .submit(form(vec![
                photo("fileA.jpg", b"aaa"),
                UploadSource::new("fileB.jpg", FailingReader::new()),
                photo("fileC.jpg", b"ccc"),
            ]))
            .await
            .unwrap_err();

        match err {
            IngestionError::Upload(StorageError::PartialUpload { ref file, ref reason }) => {
                assert_eq!(file, "fileB.jpg");
                assert!(reason.contains("simulated write failure"));
            }
            ref other => panic!("unexpected error for {}: {:?}", order, other),
        }
        assert_eq!(count_files(&dir), 0, "stage order {}", order);
        assert_eq!(count_animals(&pool).await, 0);
    }
}

// =============================================================================
// Persistence failures
// =============================================================================

#[tokio::test]
async fn test_persistence_failure_keeps_stored_files() {
    let temp = TempDir::new().unwrap();
    let dir = temp.path().join("uploaded_images");
    let ingestor = Ingestor::new(
        MediaStore::new(&dir, NamingPolicy::OriginalName),
        Arc::new(UnreachableRepository),
        StageOrder::ValidateFirst,
    );

    let err = ingestor
        .submit(form(vec![photo("fileA.jpg", b"aaa")]))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::Persistence(_)));
    assert_eq!(err.to_string(), "database is unreachable");
    assert!(dir.join("fileA.jpg").exists());
}
