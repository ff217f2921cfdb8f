use axum::{
    extract::{Path, State},
    Extension, Json,
};
use brandpulse_report::ReportView;
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestId};

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::owned_bundle;

/// Authors feeding the topic network chart.
const NETWORK_AUTHORS: i64 = 20;

/// GET /api/v1/sessions/{id}/report — shaped report data and chart configs.
pub(in crate::api) async fn get_report(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportView>>, ApiError> {
    let bundle = owned_bundle(&state.pool, id, user.id, &req_id.0).await?;
    let authors = brandpulse_db::list_top_authors(&state.pool, id, NETWORK_AUTHORS)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let view = brandpulse_report::report_view(&bundle, &authors);
    Ok(Json(ApiResponse::new(view, req_id.0)))
}
