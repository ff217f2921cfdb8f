use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use brandpulse_db::AuthorPostRow;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestId};

use super::super::{map_db_error, ApiError, ApiResponse, AppState};
use super::ensure_owned;

const DEFAULT_AUTHOR_LIMIT: i64 = 20;
const MAX_AUTHOR_LIMIT: i64 = 100;
const POSTS_PER_AUTHOR: i64 = 10;

#[derive(Debug, Deserialize)]
pub(in crate::api) struct AuthorsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct AuthorPostItem {
    id: i64,
    platform_post_id: Option<String>,
    url: Option<String>,
    content: Option<String>,
    likes: i64,
    comments: i64,
    shares: i64,
    posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub(in crate::api) struct AuthorItem {
    id: i64,
    platform: String,
    handle: String,
    display_name: Option<String>,
    followers: i64,
    is_verified: bool,
    engagement_rate: f64,
    collaboration_score: f64,
    topics: Vec<String>,
    recent_posts: Vec<AuthorPostItem>,
}

pub(in crate::api) fn normalize_author_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_AUTHOR_LIMIT)
        .clamp(1, MAX_AUTHOR_LIMIT)
}

fn post_item(row: AuthorPostRow) -> AuthorPostItem {
    AuthorPostItem {
        id: row.id,
        platform_post_id: row.platform_post_id,
        url: row.url,
        content: row.content,
        likes: row.likes,
        comments: row.comments,
        shares: row.shares,
        posted_at: row.posted_at,
    }
}

/// GET /api/v1/sessions/{id}/authors?limit= — top authors by collaboration score.
pub(in crate::api) async fn list_authors(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Query(query): Query<AuthorsQuery>,
) -> Result<Json<ApiResponse<Vec<AuthorItem>>>, ApiError> {
    let rid = &req_id.0;
    ensure_owned(&state.pool, id, user.id, rid).await?;

    let authors =
        brandpulse_db::list_top_authors(&state.pool, id, normalize_author_limit(query.limit))
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?;

    let author_ids: Vec<i64> = authors.iter().map(|a| a.id).collect();
    let posts = if author_ids.is_empty() {
        Vec::new()
    } else {
        brandpulse_db::list_recent_posts_for_authors(&state.pool, &author_ids, POSTS_PER_AUTHOR)
            .await
            .map_err(|e| map_db_error(rid.clone(), &e))?
    };

    let mut posts_by_author: HashMap<i64, Vec<AuthorPostItem>> = HashMap::new();
    for post in posts {
        posts_by_author
            .entry(post.author_id)
            .or_default()
            .push(post_item(post));
    }

    let data = authors
        .into_iter()
        .map(|a| AuthorItem {
            topics: brandpulse_report::model::parse_author_topics(a.categories.as_deref()),
            recent_posts: posts_by_author.remove(&a.id).unwrap_or_default(),
            id: a.id,
            platform: a.platform,
            handle: a.handle,
            display_name: a.display_name,
            followers: a.followers,
            is_verified: a.is_verified,
            engagement_rate: a.engagement_rate,
            collaboration_score: a.collaboration_score,
        })
        .collect();

    Ok(Json(ApiResponse::new(data, req_id.0)))
}

#[cfg(test)]
mod tests {
    use super::normalize_author_limit;

    #[test]
    fn author_limit_defaults_and_clamps() {
        assert_eq!(normalize_author_limit(None), 20);
        assert_eq!(normalize_author_limit(Some(0)), 1);
        assert_eq!(normalize_author_limit(Some(-5)), 1);
        assert_eq!(normalize_author_limit(Some(500)), 100);
        assert_eq!(normalize_author_limit(Some(35)), 35);
    }
}
