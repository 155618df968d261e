//! SQLite-backed animals repository

use super::{AnimalRepository, PersistenceError};
use crate::record::SubmissionRecord;
use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::debug;

/// Column order is the insert contract: media paths first, category last
const INSERT_ANIMAL: &str = r#"
    INSERT INTO animals (photos, name, taxonomy, etymology, iucn, geo, migration, habitat, dimensions, ds, diet, description, category)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

#[derive(Debug, Clone)]
pub struct SqliteAnimalRepository {
    pool: SqlitePool,
}

impl SqliteAnimalRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl AnimalRepository for SqliteAnimalRepository {
    async fn insert(&self, record: &SubmissionRecord) -> Result<i64, PersistenceError> {
        let result = sqlx::query(INSERT_ANIMAL)
            .bind(&record.photo)
            .bind(&record.name)
            .bind(&record.taxonomy)
            .bind(&record.etymology)
            .bind(&record.iucn)
            .bind(&record.geo)
            .bind(&record.migration)
            .bind(&record.habitat)
            .bind(&record.dimensions)
            .bind(&record.ds)
            .bind(&record.diet)
            .bind(&record.description)
            .bind(&record.category)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        debug!(id, name = %record.name, "Inserted animal");
        Ok(id)
    }
}
