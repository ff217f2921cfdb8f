use axum::{
    extract::{Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestId};

use super::super::{ApiError, ApiResponse, AppState};
use super::{owned_bundle, session_item, SessionItem};

/// GET /api/v1/sessions/{id}
pub(in crate::api) async fn get_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionItem>>, ApiError> {
    let bundle = owned_bundle(&state.pool, id, user.id, &req_id.0).await?;
    Ok(Json(ApiResponse::new(session_item(bundle), req_id.0)))
}
