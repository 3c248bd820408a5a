//! Bulk upsert endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::upsert;
use crate::AppState;

/// POST /professionals/bulk
///
/// The body must be a JSON array; anything else fails the request before
/// a single record is touched. Per-record failures land in the summary,
/// so the response status is 201 only for a clean sweep and 207 when the
/// batch partially failed.
pub async fn bulk_upsert(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> ApiResult<Response> {
    let profiles = match body {
        Value::Array(profiles) => profiles,
        _ => {
            return Err(ApiError::BadRequest(
                "Request body must be a list of profiles.".to_string(),
            ))
        }
    };

    info!("Bulk upsert of {} profiles", profiles.len());

    let summary = upsert::run_batch(&state.db, profiles).await?;

    let status = if summary.failure_count > 0 {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::CREATED
    };

    Ok((status, Json(summary)).into_response())
}
