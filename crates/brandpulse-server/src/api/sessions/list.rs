use axum::{extract::State, Extension, Json};

use crate::middleware::{AuthUser, RequestId};

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::{session_item, SessionItem};

/// GET /api/v1/sessions
pub(in crate::api) async fn list_sessions(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<ApiResponse<Vec<SessionItem>>>, ApiError> {
    let bundles = brandpulse_db::list_session_bundles(&state.pool, user.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let data = bundles.into_iter().map(session_item).collect();
    Ok(Json(ApiResponse::new(data, req_id.0)))
}
