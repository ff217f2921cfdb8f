//! Database operations for `analysis_results` and `comment_analyses`.
//!
//! Result payload columns are opaque JSON text here; the report crate owns
//! their parsing.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `analysis_results` table.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct AnalysisResultRow {
    pub id: i64,
    pub session_id: Uuid,
    pub audience_comparison: Option<String>,
    pub post_channel_distribution: Option<String>,
    pub hashtag_analysis: Option<String>,
    pub post_type_engagement: Option<String>,
    pub post_timing_data: Option<String>,
    pub brand_equity: Option<String>,
    pub keyword_clustering: Option<String>,
    pub voice_analysis: Option<String>,
    pub ai_insights: Option<String>,
    pub additional_metrics: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Payload columns for [`upsert_analysis_result`].
#[derive(Debug, Clone, Default)]
pub struct NewAnalysisResult {
    pub audience_comparison: Option<String>,
    pub post_channel_distribution: Option<String>,
    pub hashtag_analysis: Option<String>,
    pub post_type_engagement: Option<String>,
    pub post_timing_data: Option<String>,
    pub brand_equity: Option<String>,
    pub keyword_clustering: Option<String>,
    pub voice_analysis: Option<String>,
    pub ai_insights: Option<String>,
    pub additional_metrics: Option<String>,
}

/// A row from the `comment_analyses` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentAnalysisRow {
    pub id: i64,
    pub session_id: Uuid,
    pub positive_count: i32,
    pub neutral_count: i32,
    pub negative_count: i32,
    pub ai_summary: Option<String>,
    pub ai_recommendations: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCommentAnalysis {
    pub positive_count: i32,
    pub neutral_count: i32,
    pub negative_count: i32,
    pub ai_summary: Option<String>,
    pub ai_recommendations: Option<String>,
}

const RESULT_COLUMNS: &str = "id, session_id, audience_comparison, post_channel_distribution, \
     hashtag_analysis, post_type_engagement, post_timing_data, brand_equity, \
     keyword_clustering, voice_analysis, ai_insights, additional_metrics, created_at";

const COMMENT_COLUMNS: &str = "id, session_id, positive_count, neutral_count, negative_count, \
     ai_summary, ai_recommendations, created_at";

// ---------------------------------------------------------------------------
// analysis_results
// ---------------------------------------------------------------------------

/// Results for several sessions at once (for list views).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_analysis_results(
    pool: &PgPool,
    session_ids: &[Uuid],
) -> Result<Vec<AnalysisResultRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalysisResultRow>(&format!(
        "SELECT {RESULT_COLUMNS} FROM analysis_results WHERE session_id = ANY($1)"
    ))
    .bind(session_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Writes the session's result, replacing any previous one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_analysis_result(
    pool: &PgPool,
    session_id: Uuid,
    result: &NewAnalysisResult,
) -> Result<AnalysisResultRow, DbError> {
    let row = sqlx::query_as::<_, AnalysisResultRow>(&format!(
        "INSERT INTO analysis_results \
           (session_id, audience_comparison, post_channel_distribution, hashtag_analysis, \
            post_type_engagement, post_timing_data, brand_equity, keyword_clustering, \
            voice_analysis, ai_insights, additional_metrics) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
         ON CONFLICT (session_id) DO UPDATE SET \
             audience_comparison       = EXCLUDED.audience_comparison, \
             post_channel_distribution = EXCLUDED.post_channel_distribution, \
             hashtag_analysis          = EXCLUDED.hashtag_analysis, \
             post_type_engagement      = EXCLUDED.post_type_engagement, \
             post_timing_data          = EXCLUDED.post_timing_data, \
             brand_equity              = EXCLUDED.brand_equity, \
             keyword_clustering        = EXCLUDED.keyword_clustering, \
             voice_analysis            = EXCLUDED.voice_analysis, \
             ai_insights               = EXCLUDED.ai_insights, \
             additional_metrics        = EXCLUDED.additional_metrics \
         RETURNING {RESULT_COLUMNS}"
    ))
    .bind(session_id)
    .bind(result.audience_comparison.as_deref())
    .bind(result.post_channel_distribution.as_deref())
    .bind(result.hashtag_analysis.as_deref())
    .bind(result.post_type_engagement.as_deref())
    .bind(result.post_timing_data.as_deref())
    .bind(result.brand_equity.as_deref())
    .bind(result.keyword_clustering.as_deref())
    .bind(result.voice_analysis.as_deref())
    .bind(result.ai_insights.as_deref())
    .bind(result.additional_metrics.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

// ---------------------------------------------------------------------------
// comment_analyses
// ---------------------------------------------------------------------------

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_comment_analyses(
    pool: &PgPool,
    session_ids: &[Uuid],
) -> Result<Vec<CommentAnalysisRow>, DbError> {
    let rows = sqlx::query_as::<_, CommentAnalysisRow>(&format!(
        "SELECT {COMMENT_COLUMNS} FROM comment_analyses WHERE session_id = ANY($1)"
    ))
    .bind(session_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Writes the session's comment sentiment aggregate, replacing any previous one.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails, including a negative count
/// rejected by the table's CHECK constraints.
pub async fn upsert_comment_analysis(
    pool: &PgPool,
    session_id: Uuid,
    analysis: &NewCommentAnalysis,
) -> Result<CommentAnalysisRow, DbError> {
    let row = sqlx::query_as::<_, CommentAnalysisRow>(&format!(
        "INSERT INTO comment_analyses \
           (session_id, positive_count, neutral_count, negative_count, ai_summary, ai_recommendations) \
         VALUES ($1, $2, $3, $4, $5, $6) \
         ON CONFLICT (session_id) DO UPDATE SET \
             positive_count     = EXCLUDED.positive_count, \
             neutral_count      = EXCLUDED.neutral_count, \
             negative_count     = EXCLUDED.negative_count, \
             ai_summary         = EXCLUDED.ai_summary, \
             ai_recommendations = EXCLUDED.ai_recommendations \
         RETURNING {COMMENT_COLUMNS}"
    ))
    .bind(session_id)
    .bind(analysis.positive_count)
    .bind(analysis.neutral_count)
    .bind(analysis.negative_count)
    .bind(analysis.ai_summary.as_deref())
    .bind(analysis.ai_recommendations.as_deref())
    .fetch_one(pool)
    .await?;
    Ok(row)
}
