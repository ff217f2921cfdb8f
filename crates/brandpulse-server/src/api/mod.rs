mod analyze;
mod exports;
mod notifications;
mod sessions;

use std::{sync::Arc, time::Duration};

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use brandpulse_analysis::AnalysisTrigger;
use brandpulse_core::AppConfig;
use brandpulse_report::PdfRenderer;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{
    enforce_rate_limit, request_id, require_user, require_user_or_internal, RateLimitState,
    RequestId, INTERNAL_TOKEN_HEADER,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    pub trigger: AnalysisTrigger,
    pub renderer: Arc<dyn PdfRenderer>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    database: &'static str,
}

impl ResponseMeta {
    pub(crate) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(crate) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }

    pub(crate) fn session_not_found(request_id: impl Into<String>) -> Self {
        Self::new(request_id, "not_found", "session not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "unauthorized" => StatusCode::UNAUTHORIZED,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(crate) fn map_db_error(request_id: String, error: &brandpulse_db::DbError) -> ApiError {
    tracing::error!(request_id = %request_id, error = %error, "database query failed");
    ApiError::new(request_id, "internal_error", "database query failed")
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-request-id"),
            HeaderName::from_static(INTERNAL_TOKEN_HEADER),
        ])
        .expose_headers([header::CONTENT_DISPOSITION])
}

fn user_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/v1/sessions/{id}",
            get(sessions::get_session)
                .patch(sessions::mark_session_read)
                .delete(sessions::delete_session),
        )
        .route("/api/v1/sessions/{id}/authors", get(sessions::list_authors))
        .route("/api/v1/sessions/{id}/runs", get(sessions::list_runs))
        .route("/api/v1/sessions/{id}/report", get(sessions::get_report))
        .route("/api/v1/export/docx/{id}", get(exports::export_docx))
        .route("/api/v1/export/pdf-screenshot/{id}", get(exports::export_pdf))
        .route("/api/v1/export/raw/{id}", get(exports::export_raw))
        .route(
            "/api/v1/notifications/unread",
            get(notifications::unread_count),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_user,
        ))
}

fn analyze_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/analyze/{id}", post(analyze::trigger_analysis))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_user_or_internal,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    let protected = Router::new()
        .merge(user_router(&state))
        .merge(analyze_router(&state))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);

    match brandpulse_db::health_check(&state.pool).await {
        Ok(()) => (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    database: "ok",
                },
                meta,
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "health check: database unavailable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiResponse {
                    data: HealthData {
                        status: "degraded",
                        database: "unavailable",
                    },
                    meta,
                }),
            )
        }
    }
}

pub fn default_rate_limit_state() -> RateLimitState {
    RateLimitState::new(120, Duration::from_secs(60))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_codes_map_to_statuses() {
        for (code, status) in [
            ("unauthorized", StatusCode::UNAUTHORIZED),
            ("not_found", StatusCode::NOT_FOUND),
            ("validation_error", StatusCode::BAD_REQUEST),
            ("bad_request", StatusCode::BAD_REQUEST),
            ("conflict", StatusCode::CONFLICT),
            ("rate_limited", StatusCode::TOO_MANY_REQUESTS),
            ("internal_error", StatusCode::INTERNAL_SERVER_ERROR),
        ] {
            let response = ApiError::new("req-1", code, "message").into_response();
            assert_eq!(response.status(), status, "code {code}");
        }
    }

    #[test]
    fn api_error_omits_details_unless_set() {
        let plain = serde_json::to_value(ApiError::new("req-1", "not_found", "gone")).unwrap();
        assert!(plain["error"].get("details").is_none());
        assert_eq!(plain["meta"]["request_id"], "req-1");

        let detailed = ApiError::new("req-2", "validation_error", "invalid")
            .with_details(serde_json::json!([{ "field": "title", "message": "required" }]));
        let json = serde_json::to_value(detailed).unwrap();
        assert_eq!(json["error"]["details"][0]["field"], "title");
    }
}
