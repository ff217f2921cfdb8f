//! Session API handlers.
//!
//! - `GET    /api/v1/sessions`              — caller's sessions, newest first
//! - `POST   /api/v1/sessions`              — validate, create, start analysis
//! - `GET    /api/v1/sessions/{id}`         — one session with brands and results
//! - `PATCH  /api/v1/sessions/{id}`         — mark the completion notification read
//! - `DELETE /api/v1/sessions/{id}`         — delete with cascade
//! - `GET    /api/v1/sessions/{id}/authors` — top author profiles with recent posts
//! - `GET    /api/v1/sessions/{id}/runs`    — analysis run history
//! - `GET    /api/v1/sessions/{id}/report`  — shaped report and chart configs

mod authors;
mod detail;
mod list;
mod report;
mod runs;
mod write;

pub(super) use authors::list_authors;
pub(super) use detail::get_session;
pub(super) use list::list_sessions;
pub(super) use report::get_report;
pub(super) use runs::list_runs;
pub(super) use write::{create_session, delete_session, mark_session_read};

use brandpulse_core::{SentimentBreakdown, SessionStatus};
use brandpulse_db::{BrandWithData, CommentAnalysisRow, SessionBundle};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{map_db_error, ApiError};

#[derive(Debug, Serialize)]
pub(in crate::api) struct BrandDataItem {
    platform: String,
    followers: i64,
    post_count: i32,
    engagement_rate: f64,
    posting_frequency: Option<f64>,
    collected_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct BrandItem {
    id: i64,
    name: String,
    role: String,
    website: Option<String>,
    instagram: Option<String>,
    tiktok: Option<String>,
    twitter: Option<String>,
    youtube: Option<String>,
    facebook: Option<String>,
    data: Vec<BrandDataItem>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct CommentAnalysisItem {
    positive_count: i32,
    neutral_count: i32,
    negative_count: i32,
    positive_percent: f64,
    neutral_percent: f64,
    negative_percent: f64,
    ai_summary: Option<String>,
    ai_recommendations: Option<String>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct SessionItem {
    id: Uuid,
    title: String,
    status: SessionStatus,
    universe_keywords: Option<String>,
    notification_read: bool,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    brands: Vec<BrandItem>,
    /// Result payloads parsed to JSON; malformed ones are passed through as strings.
    result: Option<serde_json::Value>,
    comment_analysis: Option<CommentAnalysisItem>,
}

fn brand_item(entry: BrandWithData) -> BrandItem {
    let brand = entry.brand;
    BrandItem {
        id: brand.id,
        name: brand.name,
        role: brand.role,
        website: brand.website,
        instagram: brand.instagram,
        tiktok: brand.tiktok,
        twitter: brand.twitter,
        youtube: brand.youtube,
        facebook: brand.facebook,
        data: entry
            .data
            .into_iter()
            .map(|d| BrandDataItem {
                platform: d.platform,
                followers: d.followers,
                post_count: d.post_count,
                engagement_rate: d.engagement_rate,
                posting_frequency: d.posting_frequency,
                collected_at: d.collected_at,
            })
            .collect(),
    }
}

fn comment_item(row: CommentAnalysisRow) -> CommentAnalysisItem {
    let counts =
        SentimentBreakdown::from_counts(row.positive_count, row.neutral_count, row.negative_count);
    CommentAnalysisItem {
        positive_count: row.positive_count,
        neutral_count: row.neutral_count,
        negative_count: row.negative_count,
        positive_percent: counts.positive_percent(),
        neutral_percent: counts.neutral_percent(),
        negative_percent: counts.negative_percent(),
        ai_summary: row.ai_summary,
        ai_recommendations: row.ai_recommendations,
    }
}

pub(in crate::api) fn session_item(bundle: SessionBundle) -> SessionItem {
    let status = bundle.session.parsed_status();
    let session = bundle.session;
    SessionItem {
        id: session.id,
        title: session.title,
        status,
        universe_keywords: session.universe_keywords,
        notification_read: session.notification_read,
        created_at: session.created_at,
        completed_at: session.completed_at,
        brands: bundle.brands.into_iter().map(brand_item).collect(),
        result: bundle.result.as_ref().map(brandpulse_report::result_payloads),
        comment_analysis: bundle.comments.map(comment_item),
    }
}

/// Loads a session bundle owned by `user_id`; anything else is a 404.
pub(in crate::api) async fn owned_bundle(
    pool: &sqlx::PgPool,
    id: Uuid,
    user_id: Uuid,
    request_id: &str,
) -> Result<SessionBundle, ApiError> {
    brandpulse_db::load_session_bundle(pool, id, Some(user_id))
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .ok_or_else(|| ApiError::session_not_found(request_id))
}

/// Confirms `user_id` owns session `id` without loading its contents.
pub(in crate::api) async fn ensure_owned(
    pool: &sqlx::PgPool,
    id: Uuid,
    user_id: Uuid,
    request_id: &str,
) -> Result<(), ApiError> {
    brandpulse_db::get_owned_session(pool, id, user_id)
        .await
        .map_err(|e| map_db_error(request_id.to_owned(), &e))?
        .map(|_| ())
        .ok_or_else(|| ApiError::session_not_found(request_id))
}
