use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::middleware::{AuthUser, RequestId};

use super::{map_db_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct UnreadCount {
    count: i64,
}

/// GET /api/v1/notifications/unread — completed sessions not yet marked read.
pub(super) async fn unread_count(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<UnreadCount>>, ApiError> {
    let count = brandpulse_db::count_unread_completed(&state.pool, user.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(UnreadCount { count }, req_id.0)))
}
