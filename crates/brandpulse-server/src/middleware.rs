use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::api::{map_db_error, ApiError, AppState};

pub const INTERNAL_TOKEN_HEADER: &str = "x-internal-token";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// The user resolved from the bearer API key.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: String,
}

/// Who is calling a route that also admits trusted internal services.
#[derive(Debug, Clone)]
pub enum Caller {
    User(AuthUser),
    Internal,
}

#[derive(Debug, Clone)]
struct RateLimitWindow {
    started_at: Instant,
    count: usize,
}

/// Sliding fixed-window limiter for simple API protection.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    max_requests: usize,
    window: Duration,
    state: Arc<Mutex<RateLimitWindow>>,
}

impl RateLimitState {
    #[must_use]
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Arc::new(Mutex::new(RateLimitWindow {
                started_at: Instant::now(),
                count: 0,
            })),
        }
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

fn request_id_of(req: &Request) -> String {
    req.extensions()
        .get::<RequestId>()
        .map(|r| r.0.clone())
        .unwrap_or_default()
}

fn unauthorized(request_id: String) -> Response {
    ApiError::new(request_id, "unauthorized", "missing or invalid API key").into_response()
}

/// Looks up the user owning `token`. `Ok(None)` means no key or an unknown key.
async fn resolve_user(
    state: &AppState,
    token: Option<String>,
    request_id: &str,
) -> Result<Option<AuthUser>, ApiError> {
    let Some(token) = token else {
        return Ok(None);
    };
    let user = brandpulse_db::find_user_by_api_key(
        &state.pool,
        &state.config.api_key_hash_salt,
        &token,
    )
    .await
    .map_err(|e| map_db_error(request_id.to_owned(), &e))?;
    Ok(user.map(|u| AuthUser {
        id: u.id,
        email: u.email,
    }))
}

fn bearer_of(req: &Request) -> Option<String> {
    extract_bearer_token(req.headers().get(AUTHORIZATION)).map(ToOwned::to_owned)
}

/// Middleware requiring a bearer API key that resolves to a user.
///
/// Inserts [`AuthUser`] into request extensions.
pub async fn require_user(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let rid = request_id_of(&req);
    let token = bearer_of(&req);
    match resolve_user(&state, token, &rid).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => unauthorized(rid),
        Err(e) => e.into_response(),
    }
}

/// Middleware admitting either a matching `x-internal-token` or a user key.
///
/// Inserts [`Caller`] into request extensions. The internal bypass is off
/// when no token is configured.
pub async fn require_user_or_internal(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let rid = request_id_of(&req);
    let presented = req
        .headers()
        .get(INTERNAL_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());
    if let Some(presented) = presented {
        if internal_token_matches(state.config.internal_token.as_deref(), presented) {
            req.extensions_mut().insert(Caller::Internal);
            return next.run(req).await;
        }
        tracing::warn!(request_id = %rid, "rejected request with invalid internal token");
    }

    let token = bearer_of(&req);
    match resolve_user(&state, token, &rid).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(Caller::User(user));
            next.run(req).await
        }
        Ok(None) => unauthorized(rid),
        Err(e) => e.into_response(),
    }
}

/// Middleware enforcing a fixed request-per-window limit.
pub async fn enforce_rate_limit(
    State(rate_limit): State<RateLimitState>,
    req: Request,
    next: Next,
) -> Response {
    let mut window = rate_limit.state.lock().await;
    let elapsed = window.started_at.elapsed();

    if elapsed >= rate_limit.window {
        window.started_at = Instant::now();
        window.count = 0;
    }

    if window.count >= rate_limit.max_requests {
        drop(window);
        return ApiError::new(request_id_of(&req), "rate_limited", "rate limit exceeded")
            .into_response();
    }

    window.count += 1;
    drop(window);

    next.run(req).await
}

fn extract_bearer_token(value: Option<&HeaderValue>) -> Option<&str> {
    value
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Constant-time comparison against the configured token; always false when
/// none is configured.
fn internal_token_matches(expected: Option<&str>, presented: &str) -> bool {
    match expected {
        Some(expected) if !expected.is_empty() => {
            expected.as_bytes().ct_eq(presented.as_bytes()).into()
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_accepts_valid_header() {
        let header = HeaderValue::from_static("Bearer test-token");
        assert_eq!(extract_bearer_token(Some(&header)), Some("test-token"));
    }

    #[test]
    fn extract_bearer_token_rejects_non_bearer_header() {
        let header = HeaderValue::from_static("Basic abc123");
        assert_eq!(extract_bearer_token(Some(&header)), None);
        let blank = HeaderValue::from_static("Bearer   ");
        assert_eq!(extract_bearer_token(Some(&blank)), None);
    }

    #[test]
    fn internal_token_requires_exact_match() {
        assert!(internal_token_matches(Some("s3cret"), "s3cret"));
        assert!(!internal_token_matches(Some("s3cret"), "s3cre"));
        assert!(!internal_token_matches(Some("s3cret"), "s3cret!"));
    }

    #[test]
    fn internal_bypass_is_disabled_without_a_configured_token() {
        assert!(!internal_token_matches(None, ""));
        assert!(!internal_token_matches(None, "anything"));
        assert!(!internal_token_matches(Some(""), ""));
    }
}
