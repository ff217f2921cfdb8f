//! Export handlers.
//!
//! - `GET /api/v1/export/docx/{id}`           — structured Word document
//! - `GET /api/v1/export/pdf-screenshot/{id}` — rendered report page as PDF
//! - `GET /api/v1/export/raw/{id}`            — every stored field as JSON

use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use brandpulse_report::{export_filename_today, MAX_DOCX_AUTHORS};
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestId};

use super::{map_db_error, sessions::owned_bundle, ApiError, AppState};

const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
const PDF_CONTENT_TYPE: &str = "application/pdf";

fn attachment_header(filename: &str) -> String {
    format!("attachment; filename=\"{filename}\"")
}

fn attachment(bytes: Vec<u8>, content_type: &str, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, content_type.to_string()),
            (header::CONTENT_DISPOSITION, attachment_header(filename)),
        ],
        bytes,
    )
        .into_response()
}

/// GET /api/v1/export/docx/{id}
pub(super) async fn export_docx(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let bundle = owned_bundle(&state.pool, id, user.id, rid).await?;
    let limit = i64::try_from(MAX_DOCX_AUTHORS).unwrap_or(i64::MAX);
    let authors = brandpulse_db::list_top_authors(&state.pool, id, limit)
        .await
        .map_err(|e| map_db_error(rid.clone(), &e))?;

    let bytes = brandpulse_report::docx_export(&bundle, &authors).map_err(|e| {
        tracing::error!(request_id = %rid, session_id = %id, error = %e, "docx export failed");
        ApiError::new(rid, "internal_error", format!("failed to build document: {e}"))
    })?;

    tracing::info!(session_id = %id, bytes = bytes.len(), "docx export built");
    let filename = export_filename_today(&bundle.session.title, "docx");
    Ok(attachment(bytes, DOCX_CONTENT_TYPE, &filename))
}

/// GET /api/v1/export/pdf-screenshot/{id} — requires a completed session with results.
pub(super) async fn export_pdf(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let rid = &req_id.0;
    let bundle = owned_bundle(&state.pool, id, user.id, rid).await?;
    if !brandpulse_report::pdf_exportable(&bundle) {
        return Err(ApiError::new(
            rid,
            "not_found",
            "no completed analysis result for this session",
        ));
    }

    let bytes = brandpulse_report::pdf_export(
        &bundle,
        state.renderer.as_ref(),
        &state.config.pdf.chart_js_url,
    )
    .await
    .map_err(|e| {
        tracing::error!(request_id = %rid, session_id = %id, error = %e, "pdf export failed");
        ApiError::new(rid, "internal_error", format!("failed to render PDF: {e}"))
    })?;

    tracing::info!(session_id = %id, bytes = bytes.len(), "pdf export rendered");
    let filename = export_filename_today(&bundle.session.title, "pdf");
    Ok(attachment(bytes, PDF_CONTENT_TYPE, &filename))
}

/// GET /api/v1/export/raw/{id}
pub(super) async fn export_raw(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let bundle = owned_bundle(&state.pool, id, user.id, &req_id.0).await?;
    let filename = export_filename_today(&bundle.session.title, "json");

    Ok((
        [(header::CONTENT_DISPOSITION, attachment_header(&filename))],
        Json(brandpulse_report::raw_export(&bundle)),
    )
        .into_response())
}
