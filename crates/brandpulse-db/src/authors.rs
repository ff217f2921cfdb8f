//! Database operations for `author_profiles` and `author_posts`.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `author_profiles` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorProfileRow {
    pub id: i64,
    pub session_id: Uuid,
    pub platform: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub followers: i64,
    pub is_verified: bool,
    pub engagement_rate: f64,
    /// JSON text: either an array of topic strings or `{"topics": [...]}`.
    pub categories: Option<String>,
    pub collaboration_score: f64,
    pub created_at: DateTime<Utc>,
}

/// A row from the `author_posts` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuthorPostRow {
    pub id: i64,
    pub author_id: i64,
    pub platform_post_id: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct NewAuthorProfile {
    pub platform: String,
    pub handle: String,
    pub display_name: Option<String>,
    pub followers: i64,
    pub is_verified: bool,
    pub engagement_rate: f64,
    pub categories: Option<String>,
    pub collaboration_score: f64,
}

#[derive(Debug, Clone, Default)]
pub struct NewAuthorPost {
    pub platform_post_id: Option<String>,
    pub url: Option<String>,
    pub content: Option<String>,
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub posted_at: Option<DateTime<Utc>>,
}

const AUTHOR_COLUMNS: &str = "id, session_id, platform, handle, display_name, followers, \
     is_verified, engagement_rate, categories, collaboration_score, created_at";

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Highest collaboration scores first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_top_authors(
    pool: &PgPool,
    session_id: Uuid,
    limit: i64,
) -> Result<Vec<AuthorProfileRow>, DbError> {
    let rows = sqlx::query_as::<_, AuthorProfileRow>(&format!(
        "SELECT {AUTHOR_COLUMNS} FROM author_profiles \
         WHERE session_id = $1 \
         ORDER BY collaboration_score DESC, followers DESC, id \
         LIMIT $2"
    ))
    .bind(session_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// The `per_author` most recent posts of each listed author.
///
/// Posts without a timestamp sort last.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_recent_posts_for_authors(
    pool: &PgPool,
    author_ids: &[i64],
    per_author: i64,
) -> Result<Vec<AuthorPostRow>, DbError> {
    let rows = sqlx::query_as::<_, AuthorPostRow>(
        "SELECT id, author_id, platform_post_id, url, content, likes, comments, shares, posted_at \
         FROM ( \
             SELECT p.*, ROW_NUMBER() OVER ( \
                 PARTITION BY p.author_id ORDER BY p.posted_at DESC NULLS LAST, p.id DESC \
             ) AS rn \
             FROM author_posts p \
             WHERE p.author_id = ANY($1) \
         ) ranked \
         WHERE rn <= $2 \
         ORDER BY author_id, posted_at DESC NULLS LAST, id DESC",
    )
    .bind(author_ids)
    .bind(per_author)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_author_profile(
    pool: &PgPool,
    session_id: Uuid,
    author: &NewAuthorProfile,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO author_profiles \
           (session_id, platform, handle, display_name, followers, is_verified, \
            engagement_rate, categories, collaboration_score) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
         RETURNING id",
    )
    .bind(session_id)
    .bind(&author.platform)
    .bind(&author.handle)
    .bind(author.display_name.as_deref())
    .bind(author.followers)
    .bind(author.is_verified)
    .bind(author.engagement_rate)
    .bind(author.categories.as_deref())
    .bind(author.collaboration_score)
    .fetch_one(pool)
    .await?;
    Ok(id)
}

/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn insert_author_post(
    pool: &PgPool,
    author_id: i64,
    post: &NewAuthorPost,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO author_posts \
           (author_id, platform_post_id, url, content, likes, comments, shares, posted_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING id",
    )
    .bind(author_id)
    .bind(post.platform_post_id.as_deref())
    .bind(post.url.as_deref())
    .bind(post.content.as_deref())
    .bind(post.likes)
    .bind(post.comments)
    .bind(post.shares)
    .bind(post.posted_at)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
