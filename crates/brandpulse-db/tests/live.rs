//! Live integration tests for brandpulse-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/brandpulse-db/`).

use brandpulse_core::{BrandInput, NewSession, SessionStatus};
use brandpulse_db::{
    complete_analysis_run, count_unread_completed, create_analysis_run, create_session,
    create_user, delete_session, fail_analysis_run, fail_stale_analysis_runs,
    find_user_by_api_key, find_user_by_email, get_owned_session, get_session, hash_api_key,
    insert_author_post, insert_author_profile, list_analysis_runs, list_recent_posts_for_authors,
    list_session_bundles, list_top_authors, load_session_bundle, mark_notification_read,
    seed::seed_demo_session, set_session_status, start_analysis_run, upsert_analysis_result,
    upsert_comment_analysis, DbError, NewAnalysisResult, NewAuthorPost, NewAuthorProfile,
    NewCommentAnalysis, TriggerSource,
};
use chrono::{Duration, Utc};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert_test_user(pool: &sqlx::PgPool, email: &str) -> Uuid {
    create_user(pool, email, None, &hash_api_key("test-salt", email))
        .await
        .unwrap_or_else(|e| panic!("create_user failed for '{email}': {e}"))
        .id
}

fn brand(name: &str) -> BrandInput {
    BrandInput {
        name: name.to_string(),
        ..BrandInput::default()
    }
}

fn new_session(title: &str, competitors: &[&str]) -> NewSession {
    NewSession {
        title: title.to_string(),
        universe_keywords: Some("coffee".to_string()),
        focus_brand: brand("Focus Co"),
        competitors: competitors.iter().map(|c| brand(c)).collect(),
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn user_resolves_by_api_key_only_with_matching_salt(pool: sqlx::PgPool) {
    let hash = hash_api_key("salt", "secret-key");
    let user = create_user(&pool, "a@example.com", Some("A"), &hash)
        .await
        .expect("create_user failed");

    let found = find_user_by_api_key(&pool, "salt", "secret-key")
        .await
        .expect("lookup failed");
    assert_eq!(found.map(|u| u.id), Some(user.id));

    let wrong_salt = find_user_by_api_key(&pool, "other", "secret-key")
        .await
        .expect("lookup failed");
    assert!(wrong_salt.is_none());

    let by_email = find_user_by_email(&pool, "a@example.com")
        .await
        .expect("lookup failed");
    assert_eq!(by_email.map(|u| u.id), Some(user.id));
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn created_session_round_trips_with_brands_in_order(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("Q3 review", &["Rival A", "Rival B"]))
        .await
        .expect("create_session failed");

    assert_eq!(session.status, "pending");
    assert!(!session.notification_read);

    let bundle = load_session_bundle(&pool, session.id, Some(user_id))
        .await
        .expect("load failed")
        .expect("bundle present");
    assert_eq!(bundle.session.title, "Q3 review");
    let names: Vec<&str> = bundle.brands.iter().map(|b| b.brand.name.as_str()).collect();
    assert_eq!(names, vec!["Focus Co", "Rival A", "Rival B"]);
    assert_eq!(
        bundle.focus_brand().map(|b| b.brand.name.as_str()),
        Some("Focus Co")
    );
    assert_eq!(bundle.competitors().count(), 2);
    assert!(bundle.result.is_none());
    assert!(bundle.comments.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn sessions_are_scoped_to_their_owner(pool: sqlx::PgPool) {
    let owner = insert_test_user(&pool, "owner@example.com").await;
    let other = insert_test_user(&pool, "other@example.com").await;
    let session = create_session(&pool, owner, &new_session("Private", &[]))
        .await
        .expect("create_session failed");

    assert!(get_owned_session(&pool, session.id, other)
        .await
        .expect("query failed")
        .is_none());
    assert!(load_session_bundle(&pool, session.id, Some(other))
        .await
        .expect("query failed")
        .is_none());
    assert!(!mark_notification_read(&pool, session.id, other)
        .await
        .expect("update failed"));
    assert_eq!(
        delete_session(&pool, session.id, other)
            .await
            .expect("delete failed"),
        0
    );
    assert!(get_session(&pool, session.id)
        .await
        .expect("query failed")
        .is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn delete_cascades_and_second_delete_is_noop(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("Gone", &["Rival"]))
        .await
        .expect("create_session failed");
    upsert_analysis_result(&pool, session.id, &NewAnalysisResult::default())
        .await
        .expect("upsert result failed");

    assert_eq!(delete_session(&pool, session.id, user_id).await.unwrap(), 1);
    assert_eq!(delete_session(&pool, session.id, user_id).await.unwrap(), 0);

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM session_brands WHERE session_id = $1")
            .bind(session.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);
}

#[sqlx::test(migrations = "../../migrations")]
async fn unread_count_tracks_completed_sessions(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let a = create_session(&pool, user_id, &new_session("A", &[])).await.unwrap();
    let b = create_session(&pool, user_id, &new_session("B", &[])).await.unwrap();
    create_session(&pool, user_id, &new_session("C", &[])).await.unwrap();

    set_session_status(&pool, a.id, SessionStatus::Completed).await.unwrap();
    set_session_status(&pool, b.id, SessionStatus::Completed).await.unwrap();
    assert_eq!(count_unread_completed(&pool, user_id).await.unwrap(), 2);

    assert!(mark_notification_read(&pool, a.id, user_id).await.unwrap());
    // Idempotent.
    assert!(mark_notification_read(&pool, a.id, user_id).await.unwrap());
    assert_eq!(count_unread_completed(&pool, user_id).await.unwrap(), 1);

    let completed = get_session(&pool, b.id).await.unwrap().unwrap();
    assert!(completed.completed_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn set_status_on_missing_session_is_not_found(pool: sqlx::PgPool) {
    let err = set_session_status(&pool, Uuid::new_v4(), SessionStatus::Running)
        .await
        .expect_err("expected NotFound");
    assert!(matches!(err, DbError::NotFound));
}

#[sqlx::test(migrations = "../../migrations")]
async fn bundles_list_newest_first_with_results(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let older = create_session(&pool, user_id, &new_session("Older", &[])).await.unwrap();
    sqlx::query("UPDATE analysis_sessions SET created_at = NOW() - INTERVAL '1 day' WHERE id = $1")
        .bind(older.id)
        .execute(&pool)
        .await
        .unwrap();
    let newer = create_session(&pool, user_id, &new_session("Newer", &["X"])).await.unwrap();
    upsert_comment_analysis(
        &pool,
        newer.id,
        &NewCommentAnalysis {
            positive_count: 3,
            neutral_count: 2,
            negative_count: 1,
            ..NewCommentAnalysis::default()
        },
    )
    .await
    .unwrap();

    let bundles = list_session_bundles(&pool, user_id).await.unwrap();
    let titles: Vec<&str> = bundles.iter().map(|b| b.session.title.as_str()).collect();
    assert_eq!(titles, vec!["Newer", "Older"]);
    assert_eq!(bundles[0].brands.len(), 2);
    assert_eq!(bundles[0].comments.as_ref().map(|c| c.positive_count), Some(3));
    assert!(bundles[1].comments.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn negative_comment_counts_are_rejected(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("S", &[])).await.unwrap();

    let result = upsert_comment_analysis(
        &pool,
        session.id,
        &NewCommentAnalysis {
            positive_count: -1,
            ..NewCommentAnalysis::default()
        },
    )
    .await;
    assert!(result.is_err());
}

// ---------------------------------------------------------------------------
// Authors
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn top_authors_order_by_score_and_posts_are_capped(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("S", &[])).await.unwrap();

    let low = insert_author_profile(
        &pool,
        session.id,
        &NewAuthorProfile {
            platform: "instagram".to_string(),
            handle: "low".to_string(),
            collaboration_score: 10.0,
            ..NewAuthorProfile::default()
        },
    )
    .await
    .unwrap();
    let high = insert_author_profile(
        &pool,
        session.id,
        &NewAuthorProfile {
            platform: "instagram".to_string(),
            handle: "high".to_string(),
            collaboration_score: 90.0,
            ..NewAuthorProfile::default()
        },
    )
    .await
    .unwrap();

    let now = Utc::now();
    for i in 0..12_i64 {
        insert_author_post(
            &pool,
            high,
            &NewAuthorPost {
                content: Some(format!("post {i}")),
                posted_at: Some(now - Duration::hours(i)),
                ..NewAuthorPost::default()
            },
        )
        .await
        .unwrap();
    }
    insert_author_post(&pool, low, &NewAuthorPost::default()).await.unwrap();

    let authors = list_top_authors(&pool, session.id, 20).await.unwrap();
    let handles: Vec<&str> = authors.iter().map(|a| a.handle.as_str()).collect();
    assert_eq!(handles, vec!["high", "low"]);

    let limited = list_top_authors(&pool, session.id, 1).await.unwrap();
    assert_eq!(limited.len(), 1);

    let posts = list_recent_posts_for_authors(&pool, &[high, low], 10).await.unwrap();
    let high_posts: Vec<_> = posts.iter().filter(|p| p.author_id == high).collect();
    assert_eq!(high_posts.len(), 10);
    assert_eq!(high_posts[0].content.as_deref(), Some("post 0"));
    assert_eq!(posts.iter().filter(|p| p.author_id == low).count(), 1);
}

// ---------------------------------------------------------------------------
// Analysis runs
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn analysis_run_lifecycle_queued_to_succeeded(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("S", &[])).await.unwrap();

    let run = create_analysis_run(&pool, session.id, TriggerSource::User)
        .await
        .expect("create_analysis_run failed");
    assert_eq!(run.status, "queued");
    assert_eq!(run.trigger_source, "user");

    start_analysis_run(&pool, run.id).await.expect("start failed");
    complete_analysis_run(&pool, run.id).await.expect("complete failed");

    let runs = list_analysis_runs(&pool, session.id).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].status, "succeeded");
    assert!(runs[0].started_at.is_some());
    assert!(runs[0].completed_at.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
async fn second_in_flight_run_is_rejected_until_first_finishes(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("S", &[])).await.unwrap();

    let first = create_analysis_run(&pool, session.id, TriggerSource::Create)
        .await
        .unwrap();
    let err = create_analysis_run(&pool, session.id, TriggerSource::User)
        .await
        .expect_err("second run should conflict");
    assert!(matches!(err, DbError::RunInFlight { session_id } if session_id == session.id));

    fail_analysis_run(&pool, first.id, "boom").await.unwrap();
    let second = create_analysis_run(&pool, session.id, TriggerSource::User).await;
    assert!(second.is_ok());
}

#[sqlx::test(migrations = "../../migrations")]
async fn completing_a_queued_run_is_an_invalid_transition(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let session = create_session(&pool, user_id, &new_session("S", &[])).await.unwrap();
    let run = create_analysis_run(&pool, session.id, TriggerSource::Cli).await.unwrap();

    let err = complete_analysis_run(&pool, run.id)
        .await
        .expect_err("expected invalid transition");
    assert!(matches!(
        err,
        DbError::InvalidRunTransition {
            expected_status: "running",
            ..
        }
    ));
}

#[sqlx::test(migrations = "../../migrations")]
async fn stale_runs_are_failed_with_their_sessions(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "owner@example.com").await;
    let stale = create_session(&pool, user_id, &new_session("Stale", &[])).await.unwrap();
    let fresh = create_session(&pool, user_id, &new_session("Fresh", &[])).await.unwrap();

    let stale_run = create_analysis_run(&pool, stale.id, TriggerSource::User).await.unwrap();
    start_analysis_run(&pool, stale_run.id).await.unwrap();
    set_session_status(&pool, stale.id, SessionStatus::Running).await.unwrap();
    sqlx::query("UPDATE analysis_runs SET started_at = NOW() - INTERVAL '3 hours' WHERE id = $1")
        .bind(stale_run.id)
        .execute(&pool)
        .await
        .unwrap();

    let fresh_run = create_analysis_run(&pool, fresh.id, TriggerSource::User).await.unwrap();
    start_analysis_run(&pool, fresh_run.id).await.unwrap();

    let swept = fail_stale_analysis_runs(&pool, 7200).await.unwrap();
    assert_eq!(swept, vec![stale.id]);

    let stale_session = get_session(&pool, stale.id).await.unwrap().unwrap();
    assert_eq!(stale_session.status, "failed");
    let fresh_runs = list_analysis_runs(&pool, fresh.id).await.unwrap();
    assert_eq!(fresh_runs[0].status, "running");
}

// ---------------------------------------------------------------------------
// Seed
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn demo_seed_produces_a_completed_session_with_everything(pool: sqlx::PgPool) {
    let user_id = insert_test_user(&pool, "demo@example.com").await;
    let session_id = seed_demo_session(&pool, user_id).await.expect("seed failed");

    let bundle = load_session_bundle(&pool, session_id, Some(user_id))
        .await
        .unwrap()
        .expect("bundle present");
    assert_eq!(bundle.session.status, "completed");
    assert_eq!(bundle.brands.len(), 3);
    assert!(bundle.brands.iter().all(|b| b.data.len() == 3));
    let result = bundle.result.expect("result present");
    assert!(result.keyword_clustering.is_some());
    assert!(bundle.comments.is_some());
    assert_eq!(list_top_authors(&pool, session_id, 10).await.unwrap().len(), 3);
}
