//! Create-or-update execution for validated records

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use super::validate::{CleanFields, FieldErrors, FieldPatch};
use crate::db::professionals::{self, Professional, WriteError};

/// Persistence outcome for one record
#[derive(Debug)]
pub enum ExecOutcome {
    Persisted { id: Uuid, created: bool },
    Conflict(FieldErrors),
}

/// Persist one validated record
///
/// With a match, the patch set is merged onto the matched entity and the
/// row rewritten; without one, a fresh entity is built with defaults.
/// Constraint violations reported by the table become field-keyed
/// conflicts; any other storage failure propagates untouched.
pub async fn execute(
    pool: &SqlitePool,
    matched: Option<Professional>,
    fields: CleanFields,
) -> Result<ExecOutcome> {
    match matched {
        Some(mut entity) => {
            apply_fields(&mut entity, &fields);
            entity.updated_at = Utc::now();
            match professionals::update_professional(pool, &entity).await {
                Ok(()) => Ok(ExecOutcome::Persisted {
                    id: entity.guid,
                    created: false,
                }),
                Err(err) => conflict_or_fail(err),
            }
        }
        None => {
            let full_name = fields.full_name.clone().unwrap_or_default();
            let mut entity = Professional::new(full_name);
            apply_fields(&mut entity, &fields);
            match professionals::insert_professional(pool, &entity).await {
                Ok(()) => Ok(ExecOutcome::Persisted {
                    id: entity.guid,
                    created: true,
                }),
                Err(err) => conflict_or_fail(err),
            }
        }
    }
}

fn apply_fields(entity: &mut Professional, fields: &CleanFields) {
    if let Some(full_name) = &fields.full_name {
        entity.full_name = full_name.clone();
    }
    apply_patch(&mut entity.email, &fields.email);
    apply_patch(&mut entity.phone, &fields.phone);
    apply_patch(&mut entity.company_name, &fields.company_name);
    apply_patch(&mut entity.job_title, &fields.job_title);
    if let Some(source) = fields.source {
        entity.source = source;
    }
}

fn apply_patch(slot: &mut Option<String>, patch: &FieldPatch<String>) {
    match patch {
        FieldPatch::Keep => {}
        FieldPatch::Clear => *slot = None,
        FieldPatch::Set(value) => *slot = Some(value.clone()),
    }
}

fn conflict_or_fail(err: WriteError) -> Result<ExecOutcome> {
    match err {
        WriteError::DuplicateEmail => Ok(ExecOutcome::Conflict(FieldErrors::single(
            "email",
            "A professional with this email already exists.",
        ))),
        WriteError::DuplicatePhone => Ok(ExecOutcome::Conflict(FieldErrors::single(
            "phone",
            "A professional with this phone already exists.",
        ))),
        WriteError::MissingIdentity => Ok(ExecOutcome::Conflict(FieldErrors::single(
            "nonFieldErrors",
            "Either email or phone must be provided.",
        ))),
        WriteError::Database(err) => Err(err.into()),
    }
}
