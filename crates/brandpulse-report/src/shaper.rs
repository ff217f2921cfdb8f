//! Turns a loaded session bundle into report-ready data.
//!
//! Each stored JSON payload is parsed into a [`JsonField`]; derived views
//! (audience tuples, platform order, channel totals, voice ratios, sentiment)
//! are computed from whatever parsed successfully. A bad payload costs its
//! own section only.

use brandpulse_core::{Platform, SentimentBreakdown, SessionStatus};
use brandpulse_db::SessionBundle;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::fields::JsonField;
use crate::model::{
    AudienceEntry, ChannelEntry, EquityEntry, HashtagEntry, Insights, KeywordCluster,
    PostTypeEntry, TimingEntry, VoiceEntry,
};

/// Session metadata shown at the top of every document.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub session_id: Uuid,
    pub title: String,
    pub status: SessionStatus,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub universe_keywords: Option<String>,
    pub focus_brand: Option<String>,
    pub competitors: Vec<String>,
}

/// One `(brand, platform, followers)` observation from the audience comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AudienceTuple {
    pub brand: String,
    pub platform: String,
    pub followers: f64,
    pub engagement_rate: Option<f64>,
}

/// Posts per platform summed over every brand.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelTotal {
    pub platform: String,
    pub posts: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceRow {
    pub brand: String,
    pub owned_posts: f64,
    pub earned_mentions: f64,
    pub share_of_voice: Option<f64>,
    /// Earned mentions per owned post; `None` when the brand owns no posts.
    pub voice_ratio: Option<f64>,
}

/// Stored platform metrics for one brand (from `brand_data`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BrandMetric {
    pub brand: String,
    pub is_focus: bool,
    pub platform: String,
    pub followers: i64,
    pub post_count: i32,
    pub engagement_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SentimentSummary {
    pub counts: SentimentBreakdown,
    pub positive_percent: f64,
    pub neutral_percent: f64,
    pub negative_percent: f64,
    pub ai_summary: Option<String>,
    pub ai_recommendations: Option<String>,
}

/// A session's results, parsed and normalized for rendering.
#[derive(Debug, Clone, Serialize)]
pub struct ShapedReport {
    pub meta: ReportMeta,
    /// Whether an analysis result row exists for the session.
    pub has_result: bool,

    pub audience_comparison: JsonField<Vec<AudienceEntry>>,
    pub post_channel_distribution: JsonField<Vec<ChannelEntry>>,
    pub hashtag_analysis: JsonField<Vec<HashtagEntry>>,
    pub post_type_engagement: JsonField<Vec<PostTypeEntry>>,
    pub post_timing: JsonField<Vec<TimingEntry>>,
    pub brand_equity: JsonField<Vec<EquityEntry>>,
    pub keyword_clusters: JsonField<Vec<KeywordCluster>>,
    pub voice: JsonField<Vec<VoiceEntry>>,
    pub insights: Option<Insights>,

    pub audience: Vec<AudienceTuple>,
    /// Every platform seen in the audience comparison, first-seen order.
    pub platforms: Vec<String>,
    pub channel_totals: Vec<ChannelTotal>,
    pub voice_rows: Vec<VoiceRow>,
    pub brand_metrics: Vec<BrandMetric>,
    pub sentiment: Option<SentimentSummary>,
}

impl ShapedReport {
    /// Focus brand timing entry, for the per-platform timing charts.
    #[must_use]
    pub fn focus_timing(&self) -> Option<&TimingEntry> {
        let focus = self.meta.focus_brand.as_deref()?;
        self.post_timing
            .items()
            .iter()
            .find(|t| t.brand.trim().eq_ignore_ascii_case(focus.trim()))
    }
}

/// Parses and derives everything a renderer needs from `bundle`.
#[must_use]
pub fn shape(bundle: &SessionBundle) -> ShapedReport {
    let session_id = bundle.session.id;
    let result = bundle.result.as_ref();

    let audience_comparison = logged(
        session_id,
        "audience_comparison",
        JsonField::parse(result.and_then(|r| r.audience_comparison.as_deref())),
    );
    let post_channel_distribution = logged(
        session_id,
        "post_channel_distribution",
        JsonField::parse(result.and_then(|r| r.post_channel_distribution.as_deref())),
    );
    let hashtag_analysis = logged(
        session_id,
        "hashtag_analysis",
        JsonField::parse(result.and_then(|r| r.hashtag_analysis.as_deref())),
    );
    let post_type_engagement = logged(
        session_id,
        "post_type_engagement",
        JsonField::parse(result.and_then(|r| r.post_type_engagement.as_deref())),
    );
    let post_timing = logged(
        session_id,
        "post_timing_data",
        JsonField::parse(result.and_then(|r| r.post_timing_data.as_deref())),
    );
    let brand_equity = logged(
        session_id,
        "brand_equity",
        JsonField::parse(result.and_then(|r| r.brand_equity.as_deref())),
    );
    let keyword_clusters = logged(
        session_id,
        "keyword_clustering",
        JsonField::parse(result.and_then(|r| r.keyword_clustering.as_deref())),
    );
    let voice = logged(
        session_id,
        "voice_analysis",
        JsonField::parse(result.and_then(|r| r.voice_analysis.as_deref())),
    );
    let insights = Insights::parse(result.and_then(|r| r.ai_insights.as_deref()));

    let audience = audience_tuples(audience_comparison.items());
    let platforms = observed_platforms(&audience);
    let channel_totals = channel_totals(post_channel_distribution.items());
    let voice_rows = voice.items().iter().map(voice_row).collect();

    let focus_brand = bundle.focus_brand().map(|b| b.brand.name.clone());
    let competitors = bundle.competitors().map(|b| b.brand.name.clone()).collect();

    ShapedReport {
        meta: ReportMeta {
            session_id,
            title: bundle.session.title.clone(),
            status: bundle.session.parsed_status(),
            created_at: bundle.session.created_at,
            completed_at: bundle.session.completed_at,
            universe_keywords: bundle.session.universe_keywords.clone(),
            focus_brand,
            competitors,
        },
        has_result: result.is_some(),
        audience_comparison,
        post_channel_distribution,
        hashtag_analysis,
        post_type_engagement,
        post_timing,
        brand_equity,
        keyword_clusters,
        voice,
        insights,
        audience,
        platforms,
        channel_totals,
        voice_rows,
        brand_metrics: brand_metrics(bundle),
        sentiment: sentiment(bundle),
    }
}

fn logged<T>(session_id: Uuid, section: &'static str, field: JsonField<T>) -> JsonField<T> {
    if let Some(error) = field.error() {
        tracing::warn!(
            session_id = %session_id,
            section,
            error = %error,
            "stored payload is malformed; section omitted"
        );
    }
    field
}

/// Flattens the audience comparison into one tuple per brand and platform.
#[must_use]
pub fn audience_tuples(entries: &[AudienceEntry]) -> Vec<AudienceTuple> {
    entries
        .iter()
        .flat_map(|entry| {
            entry.platforms.iter().map(|(platform, stats)| AudienceTuple {
                brand: entry.brand.clone(),
                platform: platform.to_string(),
                followers: stats.followers,
                engagement_rate: stats.engagement_rate,
            })
        })
        .collect()
}

/// Platforms in first-seen order, without duplicates.
#[must_use]
pub fn observed_platforms(tuples: &[AudienceTuple]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for tuple in tuples {
        if !seen.iter().any(|p| p == &tuple.platform) {
            seen.push(tuple.platform.clone());
        }
    }
    seen
}

/// Sums post counts per platform across brands, first-seen order.
#[must_use]
pub fn channel_totals(entries: &[ChannelEntry]) -> Vec<ChannelTotal> {
    let mut totals: Vec<ChannelTotal> = Vec::new();
    for entry in entries {
        for (platform, posts) in entry.channels.iter() {
            match totals.iter_mut().find(|t| t.platform == platform) {
                Some(total) => total.posts += posts,
                None => totals.push(ChannelTotal {
                    platform: platform.to_string(),
                    posts: *posts,
                }),
            }
        }
    }
    totals
}

/// Earned mentions divided by owned posts; `None` when nothing is owned.
#[must_use]
pub fn voice_ratio(owned: f64, earned: f64) -> Option<f64> {
    if owned > 0.0 {
        Some(earned / owned)
    } else {
        None
    }
}

fn voice_row(entry: &VoiceEntry) -> VoiceRow {
    VoiceRow {
        brand: entry.brand.clone(),
        owned_posts: entry.owned_posts,
        earned_mentions: entry.earned_mentions,
        share_of_voice: entry.share_of_voice,
        voice_ratio: voice_ratio(entry.owned_posts, entry.earned_mentions),
    }
}

fn brand_metrics(bundle: &SessionBundle) -> Vec<BrandMetric> {
    bundle
        .brands
        .iter()
        .flat_map(|b| {
            b.data.iter().map(move |d| BrandMetric {
                brand: b.brand.name.clone(),
                is_focus: b.brand.is_focus(),
                platform: Platform::label_for(&d.platform),
                followers: d.followers,
                post_count: d.post_count,
                engagement_rate: d.engagement_rate,
            })
        })
        .collect()
}

fn sentiment(bundle: &SessionBundle) -> Option<SentimentSummary> {
    let comments = bundle.comments.as_ref()?;
    let counts = SentimentBreakdown::from_counts(
        comments.positive_count,
        comments.neutral_count,
        comments.negative_count,
    );
    Some(SentimentSummary {
        counts,
        positive_percent: counts.positive_percent(),
        neutral_percent: counts.neutral_percent(),
        negative_percent: counts.negative_percent(),
        ai_summary: comments.ai_summary.clone(),
        ai_recommendations: comments.ai_recommendations.clone(),
    })
}

#[cfg(test)]
#[path = "shaper_test.rs"]
mod tests;
