//! Database initialization and access
//!
//! Owns the SQLite connection pool and schema. All professional-record
//! queries live in [`professionals`].

pub mod professionals;

use anyhow::Result;
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
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows concurrent readers while one writer commits
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_professionals_table(&pool).await?;

    Ok(pool)
}

/// Create the professionals table
///
/// Email/phone uniqueness and the rule that every row carries at least one
/// of the two identifiers are declared here in addition to the validation
/// layer, so a write that bypasses validation is still rejected. The named
/// CHECK constraint is what the write-error classifier looks for.
pub async fn create_professionals_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS professionals (
            guid TEXT PRIMARY KEY,
            full_name TEXT NOT NULL,
            email TEXT UNIQUE,
            phone TEXT UNIQUE,
            company_name TEXT,
            job_title TEXT,
            source TEXT NOT NULL DEFAULT 'direct' CHECK (source IN ('direct', 'partner', 'internal')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CONSTRAINT email_or_phone_not_null CHECK (email IS NOT NULL OR phone IS NOT NULL)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_professionals_source ON professionals(source)")
        .execute(pool)
        .await?;

    Ok(())
}
