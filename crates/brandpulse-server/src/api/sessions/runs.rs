use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestId};

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::ensure_owned;

#[derive(Debug, Serialize)]
pub(in crate::api) struct AnalysisRunItem {
    run_id: Uuid,
    trigger_source: String,
    status: String,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
    error_message: Option<String>,
    created_at: DateTime<Utc>,
}

/// GET /api/v1/sessions/{id}/runs — analysis run history, newest first.
pub(in crate::api) async fn list_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<AnalysisRunItem>>>, ApiError> {
    ensure_owned(&state.pool, id, user.id, &req_id.0).await?;

    let rows = brandpulse_db::list_analysis_runs(&state.pool, id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = rows
        .into_iter()
        .map(|row| AnalysisRunItem {
            run_id: row.public_id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            error_message: row.error_message,
            created_at: row.created_at,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}
