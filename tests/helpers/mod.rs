//! Test helper utilities

use anyhow::Result;
use sqlx::SqlitePool;
use tempfile::TempDir;

/// Create temporary test database with the real schema applied
///
/// Returns (TempDir, SqlitePool) - TempDir must be kept alive for the
/// duration of the test.
pub async fn create_test_db() -> Result<(TempDir, SqlitePool)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test_roster.db");

    let pool = roster::db::init_database(&db_path).await?;

    Ok((temp_dir, pool))
}
