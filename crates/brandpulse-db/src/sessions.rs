//! Database operations for the `analysis_sessions` table.
//!
//! Every user-facing query is scoped by `user_id`; a session owned by someone
//! else is indistinguishable from one that does not exist.

use brandpulse_core::{BrandInput, BrandRole, NewSession, SessionStatus};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::DbError;

const SESSION_COLUMNS: &str = "id, user_id, title, status, universe_keywords, \
     notification_read, created_at, completed_at";

/// A row from the `analysis_sessions` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub status: String,
    pub universe_keywords: Option<String>,
    pub notification_read: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl SessionRow {
    /// Parsed lifecycle status. The column has a CHECK constraint, so an
    /// unknown value only happens with a hand-edited row; it reads as pending.
    #[must_use]
    pub fn parsed_status(&self) -> SessionStatus {
        self.status.parse().unwrap_or(SessionStatus::Pending)
    }
}

/// Creates a `pending` session with its focus brand and competitors.
///
/// All rows are written in one transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert fails.
pub async fn create_session(
    pool: &PgPool,
    user_id: Uuid,
    request: &NewSession,
) -> Result<SessionRow, DbError> {
    let mut tx = pool.begin().await?;

    let session = sqlx::query_as::<_, SessionRow>(&format!(
        "INSERT INTO analysis_sessions (id, user_id, title, status, universe_keywords) \
         VALUES ($1, $2, $3, 'pending', $4) \
         RETURNING {SESSION_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(user_id)
    .bind(&request.title)
    .bind(request.universe_keywords.as_deref())
    .fetch_one(&mut *tx)
    .await?;

    insert_brand(&mut tx, session.id, BrandRole::Focus, 0, &request.focus_brand).await?;
    for (i, competitor) in request.competitors.iter().enumerate() {
        let position = i16::try_from(i + 1).unwrap_or(i16::MAX);
        insert_brand(&mut tx, session.id, BrandRole::Competitor, position, competitor).await?;
    }

    tx.commit().await?;
    Ok(session)
}

async fn insert_brand(
    tx: &mut Transaction<'_, Postgres>,
    session_id: Uuid,
    role: BrandRole,
    position: i16,
    brand: &BrandInput,
) -> Result<(), DbError> {
    sqlx::query(
        "INSERT INTO session_brands \
           (session_id, role, position, name, website, instagram, tiktok, twitter, youtube, facebook) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(session_id)
    .bind(role.as_str())
    .bind(position)
    .bind(&brand.name)
    .bind(brand.website.as_deref())
    .bind(brand.instagram.as_deref())
    .bind(brand.tiktok.as_deref())
    .bind(brand.twitter.as_deref())
    .bind(brand.youtube.as_deref())
    .bind(brand.facebook.as_deref())
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Returns the user's sessions, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sessions_for_user(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SessionRow>, DbError> {
    let rows = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM analysis_sessions \
         WHERE user_id = $1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns the session if it exists and belongs to `user_id`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_owned_session(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<Option<SessionRow>, DbError> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM analysis_sessions WHERE id = $1 AND user_id = $2"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Returns the session regardless of owner. Only for trusted callers
/// (internal trigger, operator CLI, background jobs).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_session(pool: &PgPool, id: Uuid) -> Result<Option<SessionRow>, DbError> {
    let row = sqlx::query_as::<_, SessionRow>(&format!(
        "SELECT {SESSION_COLUMNS} FROM analysis_sessions WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Sets `notification_read = true`. Returns `false` if the session is not the user's.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the update fails.
pub async fn mark_notification_read(
    pool: &PgPool,
    id: Uuid,
    user_id: Uuid,
) -> Result<bool, DbError> {
    let result = sqlx::query(
        "UPDATE analysis_sessions SET notification_read = true \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Deletes the session and, via cascades, everything it owns.
///
/// Returns the number of sessions removed (0 when absent or not owned).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the delete fails.
pub async fn delete_session(pool: &PgPool, id: Uuid, user_id: Uuid) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM analysis_sessions WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Counts the user's completed sessions whose notification has not been read.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_unread_completed(pool: &PgPool, user_id: Uuid) -> Result<i64, DbError> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM analysis_sessions \
         WHERE user_id = $1 AND status = 'completed' AND notification_read = false",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(count)
}

/// Moves a session to `status`. `completed` also stamps `completed_at`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the session does not exist, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn set_session_status(
    pool: &PgPool,
    id: Uuid,
    status: SessionStatus,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_sessions \
         SET status = $2, \
             completed_at = CASE WHEN $2 = 'completed' THEN NOW() ELSE completed_at END \
         WHERE id = $1",
    )
    .bind(id)
    .bind(status.as_str())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::NotFound);
    }
    Ok(())
}
