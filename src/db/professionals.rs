//! Professional record persistence
//!
//! Lookups, inserts and partial updates for the professionals table.
//! Writes classify the table's constraint violations so callers can
//! distinguish a conflicting record from a broken database.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::error::ErrorKind;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

/// Acquisition channel for a professional record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Direct,
    Partner,
    Internal,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Direct => "direct",
            Source::Partner => "partner",
            Source::Internal => "internal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "direct" => Some(Source::Direct),
            "partner" => Some(Source::Partner),
            "internal" => Some(Source::Internal),
            _ => None,
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Direct
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Professional contact record
///
/// Email and phone are each optional, but the table rejects a row where
/// both are NULL. Phone is held in digit-only canonical form by the time
/// it reaches this layer.
#[derive(Debug, Clone)]
pub struct Professional {
    pub guid: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub source: Source,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Professional {
    /// Create a new record with defaults; identity fields start empty
    pub fn new(full_name: String) -> Self {
        let now = Utc::now();
        Self {
            guid: Uuid::new_v4(),
            full_name,
            email: None,
            phone: None,
            company_name: None,
            job_title: None,
            source: Source::Direct,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Write failure with the table's constraint violations picked out
///
/// `Database` carries everything the classifier does not recognize;
/// those must surface to the caller unchanged.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("a professional with this email already exists")]
    DuplicateEmail,
    #[error("a professional with this phone already exists")]
    DuplicatePhone,
    #[error("a professional must have an email or a phone")]
    MissingIdentity,
    #[error("database error: {0}")]
    Database(sqlx::Error),
}

fn classify_write_error(err: sqlx::Error) -> WriteError {
    if let Some(db_err) = err.as_database_error() {
        let message = db_err.message();
        match db_err.kind() {
            ErrorKind::UniqueViolation if message.contains("professionals.email") => {
                return WriteError::DuplicateEmail;
            }
            ErrorKind::UniqueViolation if message.contains("professionals.phone") => {
                return WriteError::DuplicatePhone;
            }
            ErrorKind::CheckViolation if message.contains("email_or_phone_not_null") => {
                return WriteError::MissingIdentity;
            }
            _ => {}
        }
    }
    WriteError::Database(err)
}

/// Insert a new professional record
pub async fn insert_professional(pool: &SqlitePool, professional: &Professional) -> Result<(), WriteError> {
    sqlx::query(
        r#"
        INSERT INTO professionals (guid, full_name, email, phone, company_name, job_title, source, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(professional.guid.to_string())
    .bind(&professional.full_name)
    .bind(&professional.email)
    .bind(&professional.phone)
    .bind(&professional.company_name)
    .bind(&professional.job_title)
    .bind(professional.source.as_str())
    .bind(professional.created_at.to_rfc3339())
    .bind(professional.updated_at.to_rfc3339())
    .execute(pool)
    .await
    .map_err(classify_write_error)?;

    Ok(())
}

/// Rewrite every mutable column of an existing record
///
/// The caller merges payload fields onto the loaded record first, so a
/// full-row write is how a partial update lands. `created_at` is never
/// touched.
pub async fn update_professional(pool: &SqlitePool, professional: &Professional) -> Result<(), WriteError> {
    sqlx::query(
        r#"
        UPDATE professionals
        SET full_name = ?, email = ?, phone = ?, company_name = ?, job_title = ?, source = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&professional.full_name)
    .bind(&professional.email)
    .bind(&professional.phone)
    .bind(&professional.company_name)
    .bind(&professional.job_title)
    .bind(professional.source.as_str())
    .bind(professional.updated_at.to_rfc3339())
    .bind(professional.guid.to_string())
    .execute(pool)
    .await
    .map_err(classify_write_error)?;

    Ok(())
}

/// Look up a professional by exact email
pub async fn find_professional_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Professional>> {
    let row = sqlx::query(
        r#"
        SELECT guid, full_name, email, phone, company_name, job_title, source, created_at, updated_at
        FROM professionals
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(professional_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Look up a professional by exact phone
pub async fn find_professional_by_phone(pool: &SqlitePool, phone: &str) -> Result<Option<Professional>> {
    let row = sqlx::query(
        r#"
        SELECT guid, full_name, email, phone, company_name, job_title, source, created_at, updated_at
        FROM professionals
        WHERE phone = ?
        "#,
    )
    .bind(phone)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(professional_from_row(&row)?)),
        None => Ok(None),
    }
}

/// Look up a professional by primary key
pub async fn find_professional_by_guid(pool: &SqlitePool, guid: Uuid) -> Result<Option<Professional>> {
    let row = sqlx::query(
        r#"
        SELECT guid, full_name, email, phone, company_name, job_title, source, created_at, updated_at
        FROM professionals
        WHERE guid = ?
        "#,
    )
    .bind(guid.to_string())
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(Some(professional_from_row(&row)?)),
        None => Ok(None),
    }
}

/// List professionals in creation order, optionally filtered by source
///
/// The filter value is matched verbatim; an unrecognized value matches
/// nothing.
pub async fn list_professionals(pool: &SqlitePool, source: Option<&str>) -> Result<Vec<Professional>> {
    let rows = match source {
        Some(source) => {
            sqlx::query(
                r#"
                SELECT guid, full_name, email, phone, company_name, job_title, source, created_at, updated_at
                FROM professionals
                WHERE source = ?
                ORDER BY created_at
                "#,
            )
            .bind(source)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query(
                r#"
                SELECT guid, full_name, email, phone, company_name, job_title, source, created_at, updated_at
                FROM professionals
                ORDER BY created_at
                "#,
            )
            .fetch_all(pool)
            .await?
        }
    };

    let mut professionals = Vec::new();
    for row in rows {
        professionals.push(professional_from_row(&row)?);
    }

    Ok(professionals)
}

/// Count total professionals in database
pub async fn count_professionals(pool: &SqlitePool) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM professionals")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

fn professional_from_row(row: &SqliteRow) -> Result<Professional> {
    let guid_str: String = row.get("guid");
    let guid = Uuid::parse_str(&guid_str)?;

    let source_str: String = row.get("source");
    let source = Source::parse(&source_str)
        .ok_or_else(|| anyhow!("unknown source value in database: {}", source_str))?;

    let created_str: String = row.get("created_at");
    let created_at = DateTime::parse_from_rfc3339(&created_str)?.with_timezone(&Utc);

    let updated_str: String = row.get("updated_at");
    let updated_at = DateTime::parse_from_rfc3339(&updated_str)?.with_timezone(&Utc);

    Ok(Professional {
        guid,
        full_name: row.get("full_name"),
        email: row.get("email"),
        phone: row.get("phone"),
        company_name: row.get("company_name"),
        job_title: row.get("job_title"),
        source,
        created_at,
        updated_at,
    })
}
