//! Loads a session together with its brands, platform data and results.
//!
//! The server detail view, every export, and the CLI all read through here so
//! they see the same shape.

use std::collections::HashMap;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    brands::{list_brand_data, list_brands_for_sessions, BrandDataRow, BrandRow},
    results::{list_analysis_results, list_comment_analyses, AnalysisResultRow, CommentAnalysisRow},
    sessions::{get_owned_session, get_session, list_sessions_for_user, SessionRow},
    DbError,
};

/// A brand with its per-platform metric rows.
#[derive(Debug, Clone)]
pub struct BrandWithData {
    pub brand: BrandRow,
    pub data: Vec<BrandDataRow>,
}

/// Everything stored for one session.
#[derive(Debug, Clone)]
pub struct SessionBundle {
    pub session: SessionRow,
    /// Focus brand first, then competitors in entry order.
    pub brands: Vec<BrandWithData>,
    pub result: Option<AnalysisResultRow>,
    pub comments: Option<CommentAnalysisRow>,
}

impl SessionBundle {
    #[must_use]
    pub fn focus_brand(&self) -> Option<&BrandWithData> {
        self.brands.iter().find(|b| b.brand.is_focus())
    }

    pub fn competitors(&self) -> impl Iterator<Item = &BrandWithData> {
        self.brands.iter().filter(|b| !b.brand.is_focus())
    }
}

/// Loads one session bundle.
///
/// With `owner = Some(user_id)` a session belonging to someone else reads as
/// absent. `None` is for trusted callers only.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn load_session_bundle(
    pool: &PgPool,
    id: Uuid,
    owner: Option<Uuid>,
) -> Result<Option<SessionBundle>, DbError> {
    let session = match owner {
        Some(user_id) => get_owned_session(pool, id, user_id).await?,
        None => get_session(pool, id).await?,
    };
    let Some(session) = session else {
        return Ok(None);
    };

    let mut bundles = assemble(pool, vec![session]).await?;
    Ok(bundles.pop())
}

/// Loads every bundle owned by `user_id`, newest session first.
///
/// Uses a fixed number of queries regardless of how many sessions exist.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any query fails.
pub async fn list_session_bundles(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<SessionBundle>, DbError> {
    let sessions = list_sessions_for_user(pool, user_id).await?;
    if sessions.is_empty() {
        return Ok(Vec::new());
    }
    assemble(pool, sessions).await
}

async fn assemble(pool: &PgPool, sessions: Vec<SessionRow>) -> Result<Vec<SessionBundle>, DbError> {
    let session_ids: Vec<Uuid> = sessions.iter().map(|s| s.id).collect();

    let brands = list_brands_for_sessions(pool, &session_ids).await?;
    let brand_ids: Vec<i64> = brands.iter().map(|b| b.id).collect();
    let data = if brand_ids.is_empty() {
        Vec::new()
    } else {
        list_brand_data(pool, &brand_ids).await?
    };
    let results = list_analysis_results(pool, &session_ids).await?;
    let comments = list_comment_analyses(pool, &session_ids).await?;

    let mut data_by_brand: HashMap<i64, Vec<BrandDataRow>> = HashMap::new();
    for row in data {
        data_by_brand.entry(row.brand_id).or_default().push(row);
    }

    let mut brands_by_session: HashMap<Uuid, Vec<BrandWithData>> = HashMap::new();
    for brand in brands {
        let data = data_by_brand.remove(&brand.id).unwrap_or_default();
        brands_by_session
            .entry(brand.session_id)
            .or_default()
            .push(BrandWithData { brand, data });
    }

    let mut results_by_session: HashMap<Uuid, AnalysisResultRow> =
        results.into_iter().map(|r| (r.session_id, r)).collect();
    let mut comments_by_session: HashMap<Uuid, CommentAnalysisRow> =
        comments.into_iter().map(|c| (c.session_id, c)).collect();

    Ok(sessions
        .into_iter()
        .map(|session| SessionBundle {
            brands: brands_by_session.remove(&session.id).unwrap_or_default(),
            result: results_by_session.remove(&session.id),
            comments: comments_by_session.remove(&session.id),
            session,
        })
        .collect())
}
