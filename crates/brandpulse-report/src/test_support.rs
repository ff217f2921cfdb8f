//! Fixtures shared by the unit tests in this crate.

use brandpulse_db::{
    AnalysisResultRow, BrandDataRow, BrandRow, BrandWithData, CommentAnalysisRow, SessionBundle,
    SessionRow,
};
use chrono::{TimeZone, Utc};
use uuid::Uuid;

pub(crate) const AUDIENCE: &str = r#"[
    {"brand":"Acme","isFocus":true,"platforms":{
        "instagram":{"followers":12000,"engagementRate":3.5},
        "tiktok":{"followers":8000}}},
    {"brand":"Rival","platforms":{
        "tiktok":{"followers":20000,"engagementRate":5.1},
        "youtube":{"followers":1500}}}
]"#;

pub(crate) const EQUITY: &str = r#"[
    {"brand":"Acme","reach":70,"engagement":80,"velocity":60,"sentiment":75,"overall":72},
    {"brand":"Rival","reach":85,"engagement":55,"velocity":50,"overall":64}
]"#;

pub(crate) const CHANNELS: &str = r#"[
    {"brand":"Acme","channels":{"instagram":40,"tiktok":10}},
    {"brand":"Rival","channels":{"tiktok":25,"youtube":5}}
]"#;

pub(crate) const POST_TYPES: &str = r#"[
    {"brand":"Acme","types":[{"postType":"reel","count":12,"avgEngagement":6.5},
                             {"postType":"image","count":30,"avgEngagement":2.0}]},
    {"brand":"Rival","types":[{"postType":"short","count":9,"avgEngagement":4.0}]}
]"#;

pub(crate) const TIMING: &str = r#"[
    {"brand":"Acme","platforms":{
        "instagram":{"byHour":[0,0,0,0,0,0,1,4,9,6,3,2,2,3,2,1,1,2,4,6,5,3,1,0],
                     "byDay":[3,4,5,5,6,9,8]},
        "tiktok":{"byHour":[1,0,0,0,0,0,0,1,1,1,1,1,1,1,1,1,1,2,3,5,8,9,6,3],
                  "byDay":[1,1,2,2,3,5,4]}}}
]"#;

pub(crate) const KEYWORDS: &str = r#"[
    {"label":"Flavour","keywords":["bold","smooth"],"volume":420,"sentiment":0.6,
     "brands":{"Acme":300,"Rival":120}},
    {"label":"Price","keywords":["expensive"],"volume":90}
]"#;

pub(crate) const VOICE: &str = r#"[
    {"brand":"Acme","ownedPosts":40,"earnedMentions":120,"shareOfVoice":60},
    {"brand":"Rival","ownedPosts":0,"earnedMentions":80,"shareOfVoice":40}
]"#;

pub(crate) const INSIGHTS: &str = r#"{
    "executiveSummary":"Acme leads engagement.",
    "recommendations":["Lean into reels"],
    "opportunities":["TikTok growth"],
    "risks":["Rival reach"]
}"#;

pub(crate) fn full_result() -> AnalysisResultRow {
    AnalysisResultRow {
        audience_comparison: Some(AUDIENCE.to_string()),
        post_channel_distribution: Some(CHANNELS.to_string()),
        hashtag_analysis: Some(
            r##"[{"brand":"Acme","hashtags":[{"tag":"#acme","count":14}]}]"##.to_string(),
        ),
        post_type_engagement: Some(POST_TYPES.to_string()),
        post_timing_data: Some(TIMING.to_string()),
        brand_equity: Some(EQUITY.to_string()),
        keyword_clustering: Some(KEYWORDS.to_string()),
        voice_analysis: Some(VOICE.to_string()),
        ai_insights: Some(INSIGHTS.to_string()),
        ..AnalysisResultRow::default()
    }
}

fn brand(id: i64, session_id: Uuid, role: &str, position: i16, name: &str) -> BrandRow {
    BrandRow {
        id,
        session_id,
        role: role.to_string(),
        position,
        name: name.to_string(),
        website: None,
        instagram: Some(format!("@{}", name.to_lowercase())),
        tiktok: None,
        twitter: None,
        youtube: None,
        facebook: None,
    }
}

fn data(brand_id: i64, platform: &str, followers: i64, engagement_rate: f64) -> BrandDataRow {
    BrandDataRow {
        id: brand_id * 10,
        brand_id,
        platform: platform.to_string(),
        followers,
        post_count: 42,
        engagement_rate,
        posting_frequency: None,
        raw_data: None,
        scraped_data: None,
        collected_at: Utc::now(),
    }
}

/// A completed two-brand session with the given result and 60/25/15 comment sentiment.
pub(crate) fn sample_bundle(result: Option<AnalysisResultRow>) -> SessionBundle {
    let session_id = Uuid::new_v4();
    let created_at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 30, 0).unwrap();
    SessionBundle {
        session: SessionRow {
            id: session_id,
            user_id: Uuid::new_v4(),
            title: "Acme vs Rival: Q1".to_string(),
            status: "completed".to_string(),
            universe_keywords: Some("coffee, cold brew".to_string()),
            notification_read: false,
            created_at,
            completed_at: Some(created_at + chrono::Duration::hours(2)),
        },
        brands: vec![
            BrandWithData {
                brand: brand(1, session_id, "focus", 0, "Acme"),
                data: vec![data(1, "instagram", 12_000, 3.5)],
            },
            BrandWithData {
                brand: brand(2, session_id, "competitor", 1, "Rival"),
                data: vec![data(2, "tiktok", 20_000, 5.1)],
            },
        ],
        result: result.map(|r| AnalysisResultRow { session_id, ..r }),
        comments: Some(CommentAnalysisRow {
            id: 1,
            session_id,
            positive_count: 60,
            neutral_count: 25,
            negative_count: 15,
            ai_summary: Some("Mostly happy customers.".to_string()),
            ai_recommendations: None,
            created_at,
        }),
    }
}
