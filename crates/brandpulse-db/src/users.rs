//! Database operations for the `users` table.

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Salted SHA-256 of an API key, hex-encoded. This is the only form stored.
#[must_use]
pub fn hash_api_key(salt: &str, api_key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(api_key.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Creates a user whose API key hashes to `api_key_hash`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails (including a duplicate email).
pub async fn create_user(
    pool: &PgPool,
    email: &str,
    display_name: Option<&str>,
    api_key_hash: &str,
) -> Result<UserRow, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "INSERT INTO users (id, email, display_name, api_key_hash) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, email, display_name, created_at",
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(display_name)
    .bind(api_key_hash)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Resolves the user owning `api_key`, or `None` if no user matches.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_user_by_api_key(
    pool: &PgPool,
    salt: &str,
    api_key: &str,
) -> Result<Option<UserRow>, DbError> {
    let hash = hash_api_key(salt, api_key);
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, display_name, created_at FROM users WHERE api_key_hash = $1",
    )
    .bind(hash)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Looks a user up by email.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_user_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, DbError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, email, display_name, created_at FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}
