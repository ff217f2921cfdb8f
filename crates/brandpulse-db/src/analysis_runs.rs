//! Database operations for `analysis_runs`.
//!
//! A run moves `queued -> running -> succeeded | failed`. The partial unique
//! index on `(session_id) WHERE status IN ('queued', 'running')` keeps at most
//! one in-flight run per session.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// What started an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerSource {
    /// A signed-in user via the API.
    User,
    /// A trusted service presenting the internal token.
    Internal,
    /// Kicked off automatically by session creation.
    Create,
    /// The operator CLI.
    Cli,
}

impl TriggerSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Internal => "internal",
            Self::Create => "create",
            Self::Cli => "cli",
        }
    }
}

impl fmt::Display for TriggerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A row from the `analysis_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AnalysisRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub session_id: Uuid,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const RUN_COLUMNS: &str = "id, public_id, session_id, trigger_source, status, \
     started_at, completed_at, error_message, created_at";

/// Creates a `queued` run for the session.
///
/// # Errors
///
/// Returns [`DbError::RunInFlight`] if the session already has a queued or
/// running analysis, or [`DbError::Sqlx`] if the insert fails.
pub async fn create_analysis_run(
    pool: &PgPool,
    session_id: Uuid,
    trigger_source: TriggerSource,
) -> Result<AnalysisRunRow, DbError> {
    let result = sqlx::query_as::<_, AnalysisRunRow>(&format!(
        "INSERT INTO analysis_runs (public_id, session_id, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING {RUN_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(session_id)
    .bind(trigger_source.as_str())
    .fetch_one(pool)
    .await
    .map_err(DbError::from);

    match result {
        Err(err) if err.is_unique_violation() => Err(DbError::RunInFlight { session_id }),
        other => other,
    }
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_analysis_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and sets `completed_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_analysis_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_runs \
         SET status = 'succeeded', completed_at = NOW() \
         WHERE id = $1 AND status = 'running'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a queued or running run as `failed` with `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run already finished, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn fail_analysis_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE analysis_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status IN ('queued', 'running')",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued or running",
        });
    }

    Ok(())
}

/// Runs for one session, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_analysis_runs(
    pool: &PgPool,
    session_id: Uuid,
) -> Result<Vec<AnalysisRunRow>, DbError> {
    let rows = sqlx::query_as::<_, AnalysisRunRow>(&format!(
        "SELECT {RUN_COLUMNS} FROM analysis_runs \
         WHERE session_id = $1 \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(session_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fails every run that has been in flight longer than `older_than_secs` and
/// moves its session to `failed` when the session is still `running` or
/// `pending`.
///
/// Returns the affected session ids.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if either update fails.
pub async fn fail_stale_analysis_runs(
    pool: &PgPool,
    older_than_secs: i64,
) -> Result<Vec<Uuid>, DbError> {
    let mut tx = pool.begin().await?;

    let session_ids: Vec<Uuid> = sqlx::query_scalar(
        "UPDATE analysis_runs \
         SET status = 'failed', completed_at = NOW(), \
             error_message = 'analysis did not finish before the stale deadline' \
         WHERE status IN ('queued', 'running') \
           AND COALESCE(started_at, created_at) < NOW() - ($1 * INTERVAL '1 second') \
         RETURNING session_id",
    )
    .bind(older_than_secs)
    .fetch_all(&mut *tx)
    .await?;

    if !session_ids.is_empty() {
        sqlx::query(
            "UPDATE analysis_sessions SET status = 'failed' \
             WHERE id = ANY($1) AND status IN ('pending', 'running')",
        )
        .bind(&session_ids)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    Ok(session_ids)
}
