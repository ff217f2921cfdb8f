//! Database operations for `session_brands` and `brand_data`.

use brandpulse_core::{BrandRole, Platform};
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `session_brands` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandRow {
    pub id: i64,
    pub session_id: Uuid,
    pub role: String,
    pub position: i16,
    pub name: String,
    pub website: Option<String>,
    pub instagram: Option<String>,
    pub tiktok: Option<String>,
    pub twitter: Option<String>,
    pub youtube: Option<String>,
    pub facebook: Option<String>,
}

impl BrandRow {
    #[must_use]
    pub fn is_focus(&self) -> bool {
        self.role == BrandRole::Focus.as_str()
    }

    /// Configured handle for `platform`, if any.
    #[must_use]
    pub fn handle(&self, platform: Platform) -> Option<&str> {
        let value = match platform {
            Platform::Instagram => &self.instagram,
            Platform::Tiktok => &self.tiktok,
            Platform::Twitter => &self.twitter,
            Platform::Youtube => &self.youtube,
            Platform::Facebook => &self.facebook,
        };
        value.as_deref()
    }
}

/// A row from the `brand_data` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BrandDataRow {
    pub id: i64,
    pub brand_id: i64,
    pub platform: String,
    pub followers: i64,
    pub post_count: i32,
    pub engagement_rate: f64,
    pub posting_frequency: Option<f64>,
    pub raw_data: Option<Value>,
    pub scraped_data: Option<Value>,
    pub collected_at: DateTime<Utc>,
}

/// Platform metrics for one brand, as written by the analysis service.
#[derive(Debug, Clone)]
pub struct NewBrandData {
    pub platform: String,
    pub followers: i64,
    pub post_count: i32,
    pub engagement_rate: f64,
    pub posting_frequency: Option<f64>,
    pub raw_data: Option<Value>,
    pub scraped_data: Option<Value>,
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns the brands of every listed session, focus first then competitors in order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brands_for_sessions(
    pool: &PgPool,
    session_ids: &[Uuid],
) -> Result<Vec<BrandRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandRow>(
        "SELECT id, session_id, role, position, name, website, \
                instagram, tiktok, twitter, youtube, facebook \
         FROM session_brands \
         WHERE session_id = ANY($1) \
         ORDER BY session_id, (role = 'focus') DESC, position, id",
    )
    .bind(session_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Returns every platform metric row for the listed brands.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_brand_data(
    pool: &PgPool,
    brand_ids: &[i64],
) -> Result<Vec<BrandDataRow>, DbError> {
    let rows = sqlx::query_as::<_, BrandDataRow>(
        "SELECT id, brand_id, platform, followers, post_count, engagement_rate, \
                posting_frequency, raw_data, scraped_data, collected_at \
         FROM brand_data \
         WHERE brand_id = ANY($1) \
         ORDER BY brand_id, platform",
    )
    .bind(brand_ids)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Inserts or replaces the metrics for `(brand_id, platform)`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails.
pub async fn upsert_brand_data(
    pool: &PgPool,
    brand_id: i64,
    data: &NewBrandData,
) -> Result<i64, DbError> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO brand_data \
           (brand_id, platform, followers, post_count, engagement_rate, \
            posting_frequency, raw_data, scraped_data) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (brand_id, platform) DO UPDATE SET \
             followers         = EXCLUDED.followers, \
             post_count        = EXCLUDED.post_count, \
             engagement_rate   = EXCLUDED.engagement_rate, \
             posting_frequency = EXCLUDED.posting_frequency, \
             raw_data          = EXCLUDED.raw_data, \
             scraped_data      = EXCLUDED.scraped_data, \
             collected_at      = NOW() \
         RETURNING id",
    )
    .bind(brand_id)
    .bind(&data.platform)
    .bind(data.followers)
    .bind(data.post_count)
    .bind(data.engagement_rate)
    .bind(data.posting_frequency)
    .bind(&data.raw_data)
    .bind(&data.scraped_data)
    .fetch_one(pool)
    .await?;
    Ok(id)
}
