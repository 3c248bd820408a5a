//! List and single-create endpoints

use anyhow::anyhow;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::db::professionals::{self, Professional, Source};
use crate::error::ApiResult;
use crate::upsert::executor::{self, ExecOutcome};
use crate::upsert::validate::{self, ProfessionalPayload};
use crate::AppState;

/// Wire form of a professional record
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfessionalResponse {
    pub id: Uuid,
    pub full_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub job_title: Option<String>,
    pub source: Source,
    pub created_at: DateTime<Utc>,
}

impl From<Professional> for ProfessionalResponse {
    fn from(professional: Professional) -> Self {
        Self {
            id: professional.guid,
            full_name: professional.full_name,
            email: professional.email,
            phone: professional.phone,
            company_name: professional.company_name,
            job_title: professional.job_title,
            source: professional.source,
            created_at: professional.created_at,
        }
    }
}

/// Query parameters for GET /professionals/
#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub source: Option<String>,
}

/// GET /professionals/
///
/// The source filter is taken verbatim; an unknown value yields an empty
/// list rather than an error.
pub async fn list_professionals(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<Vec<ProfessionalResponse>>> {
    let records = professionals::list_professionals(&state.db, params.source.as_deref()).await?;

    Ok(Json(records.into_iter().map(ProfessionalResponse::from).collect()))
}

/// POST /professionals/
///
/// Single-record create through the same validation and persistence path
/// as the bulk endpoint, with no matched entity. A storage conflict
/// reports exactly like a validation failure.
pub async fn create_professional(
    State(state): State<AppState>,
    Json(payload): Json<ProfessionalPayload>,
) -> ApiResult<Response> {
    let fields = match validate::validate(&payload, None) {
        Ok(fields) => fields,
        Err(errors) => return Ok((StatusCode::BAD_REQUEST, Json(errors)).into_response()),
    };

    match executor::execute(&state.db, None, fields).await? {
        ExecOutcome::Persisted { id, .. } => {
            info!("Created professional {}", id);
            let entity = professionals::find_professional_by_guid(&state.db, id)
                .await?
                .ok_or_else(|| anyhow!("professional {} missing right after insert", id))?;
            Ok((StatusCode::CREATED, Json(ProfessionalResponse::from(entity))).into_response())
        }
        ExecOutcome::Conflict(errors) => {
            Ok((StatusCode::BAD_REQUEST, Json(errors)).into_response())
        }
    }
}
