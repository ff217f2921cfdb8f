use axum::{
    extract::{Path, State},
    Extension, Json,
};
use brandpulse_analysis::AnalysisError;
use brandpulse_db::TriggerSource;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{Caller, RequestId};

use super::{map_db_error, sessions::ensure_owned, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct AnalysisStarted {
    message: &'static str,
    session_id: Uuid,
    run_id: Uuid,
}

fn map_analysis_error(request_id: String, error: AnalysisError) -> ApiError {
    match error {
        AnalysisError::SessionNotFound(_) => ApiError::session_not_found(request_id),
        AnalysisError::AlreadyRunning(_) => ApiError::new(
            request_id,
            "conflict",
            "analysis already in progress for this session",
        ),
        AnalysisError::Db(e) => map_db_error(request_id, &e),
        other => {
            tracing::error!(request_id = %request_id, error = %other, "failed to start analysis");
            ApiError::new(request_id, "internal_error", "failed to start analysis")
        }
    }
}

/// POST /api/v1/analyze/{id} — acknowledge and run the analysis in the background.
pub(super) async fn trigger_analysis(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<AnalysisStarted>>, ApiError> {
    let source = match &caller {
        Caller::User(user) => {
            ensure_owned(&state.pool, id, user.id, &req_id.0).await?;
            TriggerSource::User
        }
        Caller::Internal => TriggerSource::Internal,
    };

    let run = state
        .trigger
        .trigger(id, source)
        .await
        .map_err(|e| map_analysis_error(req_id.0.clone(), e))?;

    Ok(Json(ApiResponse::new(
        AnalysisStarted {
            message: "analysis started",
            session_id: id,
            run_id: run.public_id,
        },
        req_id.0,
    )))
}

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use uuid::Uuid;

    use super::*;

    #[test]
    fn analysis_errors_map_to_statuses() {
        let id = Uuid::new_v4();
        let cases = [
            (AnalysisError::SessionNotFound(id), StatusCode::NOT_FOUND),
            (AnalysisError::AlreadyRunning(id), StatusCode::CONFLICT),
            (
                AnalysisError::NotConfigured,
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            let response = map_analysis_error("req-1".to_string(), error).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
