//! Database initialization
//!
//! Opens (or creates) the SQLite file and makes sure the catalog schema
//! exists. Every statement is idempotent, so startup can run it against an
//! existing database.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // WAL lets request handlers read while another inserts
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create every catalog table on an already-open pool
///
/// Used by [`init_database`] and by tests running against `sqlite::memory:`.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_animals_table(pool).await?;
    Ok(())
}

async fn create_animals_table(pool: &SqlitePool) -> Result<()> {
    // Column order is the insert contract used by the ingestion service
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS animals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            photos TEXT NOT NULL,
            name TEXT NOT NULL,
            taxonomy TEXT NOT NULL,
            etymology TEXT NOT NULL,
            iucn TEXT NOT NULL,
            geo TEXT NOT NULL,
            migration TEXT NOT NULL,
            habitat TEXT NOT NULL,
            dimensions TEXT NOT NULL,
            ds TEXT NOT NULL,
            diet TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            category TEXT NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_animals_category ON animals(category)")
        .execute(pool)
        .await?;

    Ok(())
}
