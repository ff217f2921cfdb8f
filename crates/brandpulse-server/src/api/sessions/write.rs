//! Session write handlers: create, mark read, delete.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use brandpulse_core::NewSession;
use brandpulse_db::TriggerSource;
use serde::Serialize;
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestId};

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::{owned_bundle, session_item, SessionItem};

#[derive(Debug, Serialize)]
pub(in crate::api) struct NotificationReadResponse {
    id: Uuid,
    notification_read: bool,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct DeleteResponse {
    id: Uuid,
    deleted: bool,
}

/// POST /api/v1/sessions — validate, create a `pending` session, start analysis.
pub(in crate::api) async fn create_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Json(body): Json<NewSession>,
) -> Result<(StatusCode, Json<ApiResponse<SessionItem>>), ApiError> {
    let rid = &req_id.0;

    let request = body.validated().map_err(|violations| {
        ApiError::new(rid, "validation_error", "session request is invalid")
            .with_details(serde_json::json!(violations))
    })?;

    let session = brandpulse_db::create_session(&state.pool, user.id, &request)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;
    tracing::info!(session_id = %session.id, user_id = %user.id, "session created");

    // Loaded before the trigger so the response shows the session as inserted.
    let bundle = owned_bundle(&state.pool, session.id, user.id, rid).await?;

    // The session stays pending if the run cannot be recorded; it can be
    // retriggered through /analyze.
    if let Err(e) = state.trigger.trigger(session.id, TriggerSource::Create).await {
        tracing::error!(session_id = %session.id, error = %e, "failed to start analysis");
    }

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(session_item(bundle), req_id.0)),
    ))
}

/// PATCH /api/v1/sessions/{id} — mark the completion notification read.
pub(in crate::api) async fn mark_session_read(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<NotificationReadResponse>>, ApiError> {
    let updated = brandpulse_db::mark_notification_read(&state.pool, id, user.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if !updated {
        return Err(ApiError::session_not_found(req_id.0));
    }

    Ok(Json(ApiResponse::new(
        NotificationReadResponse {
            id,
            notification_read: true,
        },
        req_id.0,
    )))
}

/// DELETE /api/v1/sessions/{id} — succeeds whether or not anything was deleted.
pub(in crate::api) async fn delete_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let affected = brandpulse_db::delete_session(&state.pool, id, user.id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    if affected > 0 {
        tracing::info!(session_id = %id, user_id = %user.id, "session deleted");
    }

    Ok(Json(ApiResponse::new(
        DeleteResponse {
            id,
            deleted: affected > 0,
        },
        req_id.0,
    )))
}
