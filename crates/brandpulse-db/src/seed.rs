//! Demo data for exercising the exports without a live analysis service.

use brandpulse_core::{BrandInput, NewSession, Platform, SessionStatus};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    authors::{insert_author_post, insert_author_profile, NewAuthorPost, NewAuthorProfile},
    brands::{list_brands_for_sessions, upsert_brand_data, NewBrandData},
    results::{upsert_analysis_result, upsert_comment_analysis, NewAnalysisResult, NewCommentAnalysis},
    sessions::{create_session, set_session_status},
    DbError,
};

const DEMO_BRANDS: [(&str, &str); 3] = [
    ("Northwind Coffee", "https://northwind.example"),
    ("Blue Bottle Co", "https://bluebottle.example"),
    ("Summit Roasters", "https://summit.example"),
];

/// Per-brand (followers, engagement rate, posts) for instagram, tiktok, twitter.
const DEMO_METRICS: [[(i64, f64, i32); 3]; 3] = [
    [(184_000, 3.4, 412), (92_500, 6.1, 138), (41_200, 0.9, 1_530)],
    [(256_000, 2.8, 520), (61_000, 5.2, 97), (88_300, 1.1, 2_210)],
    [(72_400, 4.6, 233), (143_000, 7.4, 201), (12_900, 0.7, 640)],
];

const DEMO_PLATFORMS: [Platform; 3] = [Platform::Instagram, Platform::Tiktok, Platform::Twitter];

/// Creates a completed session owned by `user_id` with every result payload
/// populated, plus brand data, comment sentiment and a few author profiles.
///
/// Returns the new session id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any write fails.
pub async fn seed_demo_session(pool: &PgPool, user_id: Uuid) -> Result<Uuid, DbError> {
    let brand_input = |name: &str, website: &str, slug: &str| BrandInput {
        name: name.to_string(),
        website: Some(website.to_string()),
        instagram: Some(format!("@{slug}")),
        tiktok: Some(format!("@{slug}")),
        twitter: Some(format!("@{slug}")),
        youtube: None,
        facebook: None,
    };

    let request = NewSession {
        title: "Coffee category benchmark".to_string(),
        universe_keywords: Some("cold brew, single origin, espresso".to_string()),
        focus_brand: brand_input(DEMO_BRANDS[0].0, DEMO_BRANDS[0].1, "northwind"),
        competitors: vec![
            brand_input(DEMO_BRANDS[1].0, DEMO_BRANDS[1].1, "bluebottle"),
            brand_input(DEMO_BRANDS[2].0, DEMO_BRANDS[2].1, "summit"),
        ],
    };

    let session = create_session(pool, user_id, &request).await?;
    let brands = list_brands_for_sessions(pool, &[session.id]).await?;

    for (brand, metrics) in brands.iter().zip(DEMO_METRICS.iter()) {
        for (platform, (followers, engagement, posts)) in DEMO_PLATFORMS.iter().zip(metrics) {
            upsert_brand_data(
                pool,
                brand.id,
                &NewBrandData {
                    platform: platform.as_str().to_string(),
                    followers: *followers,
                    post_count: *posts,
                    engagement_rate: *engagement,
                    posting_frequency: Some(f64::from(*posts) / 52.0),
                    raw_data: None,
                    scraped_data: Some(json!({ "source": "demo" })),
                },
            )
            .await?;
        }
    }

    upsert_analysis_result(pool, session.id, &demo_result()).await?;
    upsert_comment_analysis(
        pool,
        session.id,
        &NewCommentAnalysis {
            positive_count: 612,
            neutral_count: 255,
            negative_count: 153,
            ai_summary: Some(
                "Comments are mostly positive about flavour; complaints centre on shipping delays."
                    .to_string(),
            ),
            ai_recommendations: Some(
                "Address delivery times publicly and feature customer brewing photos.".to_string(),
            ),
        },
    )
    .await?;

    seed_authors(pool, session.id).await?;
    set_session_status(pool, session.id, SessionStatus::Completed).await?;

    Ok(session.id)
}

async fn seed_authors(pool: &PgPool, session_id: Uuid) -> Result<(), DbError> {
    let authors = [
        ("brewmaster_jo", "Jo Brewer", 48_000, true, 5.8, 92.5, json!(["coffee", "latte art"])),
        ("dailygrind", "The Daily Grind", 120_500, true, 3.2, 88.0, json!({ "topics": ["coffee", "reviews"] })),
        ("beanhunter", "Bean Hunter", 9_800, false, 8.9, 74.25, json!(["single origin", "travel"])),
    ];

    let now = Utc::now();
    for (handle, display, followers, verified, engagement, score, categories) in authors {
        let author_id = insert_author_profile(
            pool,
            session_id,
            &NewAuthorProfile {
                platform: Platform::Instagram.as_str().to_string(),
                handle: handle.to_string(),
                display_name: Some(display.to_string()),
                followers,
                is_verified: verified,
                engagement_rate: engagement,
                categories: Some(categories.to_string()),
                collaboration_score: score,
            },
        )
        .await?;

        for day in 0..3_i64 {
            insert_author_post(
                pool,
                author_id,
                &NewAuthorPost {
                    platform_post_id: Some(format!("{handle}-{day}")),
                    url: Some(format!("https://instagram.example/p/{handle}-{day}")),
                    content: Some(format!("Morning pour-over #{day}")),
                    likes: 1_200 - day * 150,
                    comments: 80 - day * 10,
                    shares: 12,
                    posted_at: Some(now - Duration::days(day)),
                },
            )
            .await?;
        }
    }
    Ok(())
}

fn demo_result() -> NewAnalysisResult {
    let [focus, second, third] = DEMO_BRANDS.map(|(name, _)| name);

    let audience: Vec<Value> = DEMO_BRANDS
        .iter()
        .zip(DEMO_METRICS.iter())
        .enumerate()
        .map(|(i, ((name, _), metrics))| {
            let platforms: serde_json::Map<String, Value> = DEMO_PLATFORMS
                .iter()
                .zip(metrics)
                .map(|(p, (followers, engagement, _))| {
                    (
                        p.as_str().to_string(),
                        json!({ "followers": followers, "engagementRate": engagement }),
                    )
                })
                .collect();
            json!({ "brand": name, "isFocus": i == 0, "platforms": platforms })
        })
        .collect();

    let channels: Vec<Value> = DEMO_BRANDS
        .iter()
        .zip(DEMO_METRICS.iter())
        .map(|((name, _), metrics)| {
            let channels: serde_json::Map<String, Value> = DEMO_PLATFORMS
                .iter()
                .zip(metrics)
                .map(|(p, (_, _, posts))| (p.as_str().to_string(), json!(posts)))
                .collect();
            json!({ "brand": name, "channels": channels })
        })
        .collect();

    let by_hour: Vec<u32> = (0..24).map(|h| if (7..10).contains(&h) { 40 + h } else { 5 + h % 6 }).collect();
    let by_day = [18, 22, 25, 24, 30, 41, 37];

    NewAnalysisResult {
        audience_comparison: Some(Value::Array(audience).to_string()),
        post_channel_distribution: Some(Value::Array(channels).to_string()),
        hashtag_analysis: Some(
            json!([
                { "brand": focus, "hashtags": [
                    { "tag": "#coldbrew", "count": 84, "avgEngagement": 4.1 },
                    { "tag": "#northwind", "count": 61, "avgEngagement": 3.2 }
                ]},
                { "brand": second, "hashtags": [{ "tag": "#pourover", "count": 47, "avgEngagement": 2.9 }] },
                { "brand": third, "hashtags": [{ "tag": "#summitroast", "count": 33 }] }
            ])
            .to_string(),
        ),
        post_type_engagement: Some(
            json!([
                { "brand": focus, "types": [
                    { "postType": "reel", "count": 120, "avgEngagement": 6.3 },
                    { "postType": "image", "count": 240, "avgEngagement": 2.7 },
                    { "postType": "carousel", "count": 52, "avgEngagement": 4.4 }
                ]},
                { "brand": second, "types": [
                    { "postType": "reel", "count": 90, "avgEngagement": 5.1 },
                    { "postType": "image", "count": 400, "avgEngagement": 2.2 }
                ]}
            ])
            .to_string(),
        ),
        post_timing_data: Some(
            json!([
                { "brand": focus, "platforms": {
                    "instagram": { "byHour": by_hour, "byDay": by_day },
                    "tiktok": { "byHour": by_hour.iter().rev().collect::<Vec<_>>(), "byDay": by_day }
                }}
            ])
            .to_string(),
        ),
        brand_equity: Some(
            json!([
                { "brand": focus, "reach": 72, "engagement": 81, "velocity": 64, "sentiment": 70, "overall": 73 },
                { "brand": second, "reach": 85, "engagement": 66, "velocity": 58, "sentiment": 62, "overall": 68 },
                { "brand": third, "reach": 49, "engagement": 88, "velocity": 77, "overall": 71 }
            ])
            .to_string(),
        ),
        keyword_clustering: Some(
            json!([
                { "label": "Brewing methods", "keywords": ["pour over", "aeropress", "french press"],
                  "volume": 1840, "sentiment": 0.62, "brands": { focus: 720, second: 810, third: 310 } },
                { "label": "Sustainability", "keywords": ["compostable", "fair trade"],
                  "volume": 960, "sentiment": 0.41 }
            ])
            .to_string(),
        ),
        voice_analysis: Some(
            json!([
                { "brand": focus, "ownedPosts": 412, "earnedMentions": 1030, "shareOfVoice": 38.5 },
                { "brand": second, "ownedPosts": 520, "earnedMentions": 980, "shareOfVoice": 36.6 },
                { "brand": third, "ownedPosts": 0, "earnedMentions": 667, "shareOfVoice": 24.9 }
            ])
            .to_string(),
        ),
        ai_insights: Some(
            json!({
                "executiveSummary": "Northwind leads on engagement quality but trails Blue Bottle on reach.",
                "recommendations": ["Double down on short-form video", "Post between 7 and 9 am"],
                "opportunities": ["Sustainability conversations are under-served"],
                "risks": ["Summit Roasters is growing fast on TikTok"]
            })
            .to_string(),
        ),
        additional_metrics: Some(json!({ "demo": true }).to_string()),
    }
}
