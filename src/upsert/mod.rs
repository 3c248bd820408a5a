//! Bulk upsert pipeline
//!
//! Each record of a batch runs match → validate → execute in input
//! order. A record's failure is captured in the summary and never stops
//! the records after it; only an unclassified storage failure aborts the
//! request.

pub mod executor;
pub mod matcher;
pub mod validate;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use self::executor::ExecOutcome;
use self::validate::{FieldErrors, ProfessionalPayload};

/// One failed record in a batch response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchError {
    pub index: usize,
    pub validation_errors: FieldErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Aggregated result of one bulk request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub success_count: usize,
    pub failure_count: usize,
    pub errors: Vec<BatchError>,
}

#[derive(Debug)]
enum RecordOutcome {
    Persisted { id: Uuid, created: bool },
    Failed(FieldErrors),
}

/// Run a whole batch against the database
///
/// Records are processed strictly in input order, so a later record sees
/// everything an earlier one committed; two records aiming at the same
/// entity cannot race within one request.
pub async fn run_batch(pool: &SqlitePool, profiles: Vec<Value>) -> Result<BatchSummary> {
    let mut success_count = 0;
    let mut failure_count = 0;
    let mut errors = Vec::new();

    for (index, profile) in profiles.into_iter().enumerate() {
        let payload: ProfessionalPayload = match serde_json::from_value(profile) {
            Ok(payload) => payload,
            Err(err) => {
                warn!("Record {} is not a usable profile object: {}", index, err);
                failure_count += 1;
                errors.push(BatchError {
                    index,
                    validation_errors: FieldErrors::single(
                        "nonFieldErrors",
                        format!("Invalid record: {}.", err),
                    ),
                    email: None,
                    phone: None,
                });
                continue;
            }
        };

        match process_record(pool, &payload).await? {
            RecordOutcome::Persisted { id, created } => {
                success_count += 1;
                if created {
                    debug!("Record {} created professional {}", index, id);
                } else {
                    debug!("Record {} updated professional {}", index, id);
                }
            }
            RecordOutcome::Failed(field_errors) => {
                warn!("Record {} failed: {:?}", index, field_errors);
                failure_count += 1;
                errors.push(BatchError {
                    index,
                    validation_errors: field_errors,
                    email: owned_identity(payload.raw_email()),
                    phone: owned_identity(payload.raw_phone()),
                });
            }
        }
    }

    info!(
        "Bulk upsert finished: {} succeeded, {} failed",
        success_count, failure_count
    );

    Ok(BatchSummary {
        success_count,
        failure_count,
        errors,
    })
}

async fn process_record(pool: &SqlitePool, payload: &ProfessionalPayload) -> Result<RecordOutcome> {
    let matched = matcher::find_match(pool, payload.raw_email(), payload.raw_phone()).await?;

    let fields = match validate::validate(payload, matched.as_ref()) {
        Ok(fields) => fields,
        Err(errors) => return Ok(RecordOutcome::Failed(errors)),
    };

    match executor::execute(pool, matched, fields).await? {
        ExecOutcome::Persisted { id, created } => Ok(RecordOutcome::Persisted { id, created }),
        ExecOutcome::Conflict(errors) => Ok(RecordOutcome::Failed(errors)),
    }
}

fn owned_identity(value: Option<&str>) -> Option<String> {
    value.filter(|value| !value.is_empty()).map(String::from)
}
