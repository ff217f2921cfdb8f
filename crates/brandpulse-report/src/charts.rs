//! Chart specifications built from shaped report data.
//!
//! Every builder returns a Chart.js configuration object. Chart types Chart.js
//! lacks natively (matrix, sankey, graph, word cloud, venn) use the config
//! shape of the matching community plugin. Brand colours always come from
//! the caller's [`BrandPalette`].

use brandpulse_core::{BrandPalette, Platform, SentimentBreakdown};
use serde::Serialize;
use serde_json::{json, Value};

use crate::model::{EquityEntry, KeywordCluster, PlatformTiming, PostTypeEntry};
use crate::shaper::{AudienceTuple, ChannelTotal, ShapedReport, VoiceRow};

const EQUITY_AXES: [&str; 5] = ["Reach", "Engagement", "Velocity", "Sentiment", "Overall"];
const DAY_LABELS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const SENTIMENT_COLORS: [&str; 3] = ["#22C55E", "#94A3B8", "#EF4444"];
const FALLBACK_PLATFORM_COLOR: &str = "#64748B";

const WORD_MIN_SIZE: f64 = 12.0;
const WORD_MAX_SIZE: f64 = 64.0;

fn platform_color(key: &str) -> &'static str {
    match key.parse::<Platform>() {
        Ok(Platform::Instagram) => "#E1306C",
        Ok(Platform::Tiktok) => "#111827",
        Ok(Platform::Twitter) => "#1DA1F2",
        Ok(Platform::Youtube) => "#FF0000",
        Ok(Platform::Facebook) => "#1877F2",
        Err(()) => FALLBACK_PLATFORM_COLOR,
    }
}

fn hour_labels() -> Vec<String> {
    (0..24).map(|h| format!("{h:02}:00")).collect()
}

fn base_options(title: &str) -> Value {
    json!({
        "responsive": true,
        "animation": false,
        "plugins": {
            "title": { "display": true, "text": title },
            "legend": { "position": "bottom" }
        }
    })
}

/// Brand-equity scores on a five-axis radar, one dataset per brand.
pub fn equity_radar(equity: &[EquityEntry], palette: &mut BrandPalette) -> Value {
    let datasets: Vec<Value> = equity
        .iter()
        .map(|e| {
            json!({
                "label": e.brand,
                "data": [e.reach, e.engagement, e.velocity, e.sentiment.unwrap_or(0.0), e.overall],
                "borderColor": palette.color_for(&e.brand),
                "backgroundColor": palette.fill_for(&e.brand, 0x33),
                "pointRadius": 3
            })
        })
        .collect();

    let mut options = base_options("Brand equity");
    options["scales"] = json!({ "r": { "suggestedMin": 0, "suggestedMax": 100 } });

    json!({
        "type": "radar",
        "data": { "labels": EQUITY_AXES, "datasets": datasets },
        "options": options
    })
}

/// Overall brand-equity score per brand.
pub fn equity_bar(equity: &[EquityEntry], palette: &mut BrandPalette) -> Value {
    let labels: Vec<&str> = equity.iter().map(|e| e.brand.as_str()).collect();
    let colors: Vec<&str> = equity.iter().map(|e| palette.color_for(&e.brand)).collect();
    let data: Vec<f64> = equity.iter().map(|e| e.overall).collect();

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{ "label": "Overall score", "data": data, "backgroundColor": colors }]
        },
        "options": base_options("Overall brand equity")
    })
}

/// Followers per platform, grouped by brand.
pub fn audience_bar(
    tuples: &[AudienceTuple],
    platforms: &[String],
    palette: &mut BrandPalette,
) -> Value {
    let labels: Vec<String> = platforms.iter().map(|p| Platform::label_for(p)).collect();
    let datasets: Vec<Value> = brands_in_order(tuples.iter().map(|t| t.brand.as_str()))
        .into_iter()
        .map(|brand| {
            let data: Vec<f64> = platforms
                .iter()
                .map(|p| {
                    tuples
                        .iter()
                        .find(|t| t.brand == brand && &t.platform == p)
                        .map_or(0.0, |t| t.followers)
                })
                .collect();
            json!({
                "label": brand,
                "data": data,
                "backgroundColor": palette.color_for(brand)
            })
        })
        .collect();

    json!({
        "type": "bar",
        "data": { "labels": labels, "datasets": datasets },
        "options": base_options("Audience by platform")
    })
}

/// Followers against engagement rate, one point per brand and platform.
pub fn audience_scatter(tuples: &[AudienceTuple], palette: &mut BrandPalette) -> Value {
    let datasets: Vec<Value> = brands_in_order(tuples.iter().map(|t| t.brand.as_str()))
        .into_iter()
        .map(|brand| {
            let points: Vec<Value> = tuples
                .iter()
                .filter(|t| t.brand == brand)
                .map(|t| {
                    json!({
                        "x": t.followers,
                        "y": t.engagement_rate.unwrap_or(0.0),
                        "platform": Platform::label_for(&t.platform)
                    })
                })
                .collect();
            json!({
                "label": brand,
                "data": points,
                "backgroundColor": palette.color_for(brand),
                "pointRadius": 6
            })
        })
        .collect();

    let mut options = base_options("Followers vs engagement");
    options["scales"] = json!({
        "x": { "type": "logarithmic", "title": { "display": true, "text": "Followers" } },
        "y": { "title": { "display": true, "text": "Engagement rate (%)" } }
    });

    json!({ "type": "scatter", "data": { "datasets": datasets }, "options": options })
}

/// Owned posts against earned mentions per brand.
pub fn voice_comparison(rows: &[VoiceRow], palette: &mut BrandPalette) -> Value {
    let labels: Vec<&str> = rows.iter().map(|r| r.brand.as_str()).collect();
    let owned: Vec<f64> = rows.iter().map(|r| r.owned_posts).collect();
    let earned: Vec<f64> = rows.iter().map(|r| r.earned_mentions).collect();
    let solid: Vec<&str> = rows.iter().map(|r| palette.color_for(&r.brand)).collect();
    let faded: Vec<String> = rows.iter().map(|r| palette.fill_for(&r.brand, 0x80)).collect();

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [
                { "label": "Owned posts", "data": owned, "backgroundColor": solid },
                { "label": "Earned mentions", "data": earned, "backgroundColor": faded }
            ]
        },
        "options": base_options("Owned vs earned voice")
    })
}

/// Earned mentions per owned post. Brands with no owned posts plot as gaps.
pub fn voice_ratio(rows: &[VoiceRow], palette: &mut BrandPalette) -> Value {
    let labels: Vec<&str> = rows.iter().map(|r| r.brand.as_str()).collect();
    let data: Vec<Option<f64>> = rows.iter().map(|r| r.voice_ratio).collect();
    let colors: Vec<&str> = rows.iter().map(|r| palette.color_for(&r.brand)).collect();

    let mut options = base_options("Voice ratio (earned / owned)");
    options["indexAxis"] = json!("y");

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{ "label": "Voice ratio", "data": data, "backgroundColor": colors }]
        },
        "options": options
    })
}

/// Share of posts per platform across all brands.
#[must_use]
pub fn channel_pie(totals: &[ChannelTotal]) -> Value {
    let labels: Vec<String> = totals.iter().map(|t| Platform::label_for(&t.platform)).collect();
    let data: Vec<f64> = totals.iter().map(|t| t.posts).collect();
    let colors: Vec<&str> = totals.iter().map(|t| platform_color(&t.platform)).collect();

    json!({
        "type": "pie",
        "data": {
            "labels": labels,
            "datasets": [{ "data": data, "backgroundColor": colors }]
        },
        "options": base_options("Post channel distribution")
    })
}

/// Comment sentiment split.
#[must_use]
pub fn sentiment_pie(sentiment: &SentimentBreakdown) -> Value {
    json!({
        "type": "doughnut",
        "data": {
            "labels": ["Positive", "Neutral", "Negative"],
            "datasets": [{
                "data": [sentiment.positive, sentiment.neutral, sentiment.negative],
                "backgroundColor": SENTIMENT_COLORS
            }]
        },
        "options": base_options("Comment sentiment")
    })
}

/// Average engagement per post type for one brand.
pub fn post_type_bar(entry: &PostTypeEntry, palette: &mut BrandPalette) -> Value {
    let labels: Vec<&str> = entry.types.iter().map(|t| t.post_type.as_str()).collect();
    let data: Vec<f64> = entry.types.iter().map(|t| t.avg_engagement).collect();
    let counts: Vec<f64> = entry.types.iter().map(|t| t.count).collect();

    json!({
        "type": "bar",
        "data": {
            "labels": labels,
            "datasets": [{
                "label": "Avg engagement",
                "data": data,
                "postCounts": counts,
                "backgroundColor": palette.color_for(&entry.brand)
            }]
        },
        "options": base_options(&format!("{}: engagement by post type", entry.brand))
    })
}

/// Posting activity by hour of day on one platform.
pub fn timing_line(
    brand: &str,
    platform: &str,
    timing: &PlatformTiming,
    palette: &mut BrandPalette,
) -> Value {
    json!({
        "type": "line",
        "data": {
            "labels": hour_labels(),
            "datasets": [{
                "label": brand,
                "data": timing.by_hour,
                "borderColor": palette.color_for(brand),
                "backgroundColor": palette.fill_for(brand, 0x26),
                "fill": true,
                "tension": 0.3
            }]
        },
        "options": base_options(&format!("{} posting times", Platform::label_for(platform)))
    })
}

/// Day x hour activity matrix. Uses the stored grid when present, otherwise
/// spreads the daily totals over the hourly profile.
#[must_use]
pub fn timing_heatmap(brand: &str, platform: &str, timing: &PlatformTiming) -> Value {
    let grid = timing
        .grid
        .clone()
        .unwrap_or_else(|| derive_grid(&timing.by_day, &timing.by_hour));
    let max = grid
        .iter()
        .flatten()
        .copied()
        .fold(0.0_f64, f64::max);

    let cells: Vec<Value> = grid
        .iter()
        .enumerate()
        .flat_map(|(day, hours)| {
            hours.iter().enumerate().map(move |(hour, v)| {
                json!({ "x": hour, "y": DAY_LABELS.get(day).copied().unwrap_or("?"), "v": v })
            })
        })
        .collect();

    json!({
        "type": "matrix",
        "data": {
            "datasets": [{
                "label": format!("{brand} on {}", Platform::label_for(platform)),
                "data": cells,
                "maxValue": max
            }]
        },
        "options": {
            "plugins": { "title": { "display": true, "text": "Activity heatmap" } },
            "scales": {
                "x": { "type": "linear", "min": 0, "max": 23 },
                "y": { "type": "category", "labels": DAY_LABELS }
            }
        }
    })
}

fn derive_grid(by_day: &[f64], by_hour: &[f64]) -> Vec<Vec<f64>> {
    let hour_total: f64 = by_hour.iter().sum();
    (0..7)
        .map(|d| {
            let day = by_day.get(d).copied().unwrap_or(0.0);
            (0..24)
                .map(|h| {
                    let weight = by_hour.get(h).copied().unwrap_or(0.0);
                    if hour_total > 0.0 {
                        day * weight / hour_total
                    } else {
                        0.0
                    }
                })
                .collect()
        })
        .collect()
}

/// Audience flow from each brand to the platforms it reaches.
pub fn audience_sankey(tuples: &[AudienceTuple], palette: &mut BrandPalette) -> Value {
    let flows: Vec<Value> = tuples
        .iter()
        .filter(|t| t.followers > 0.0)
        .map(|t| {
            json!({
                "from": t.brand,
                "to": Platform::label_for(&t.platform),
                "flow": t.followers
            })
        })
        .collect();
    let colors: serde_json::Map<String, Value> =
        brands_in_order(tuples.iter().map(|t| t.brand.as_str()))
            .into_iter()
            .map(|b| (b.to_string(), json!(palette.color_for(b))))
            .collect();

    json!({
        "type": "sankey",
        "data": { "datasets": [{ "label": "Audience flow", "data": flows, "colors": colors }] },
        "options": base_options("Audience flow")
    })
}

/// An author and the topics they post about, for the network graph.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorTopics {
    pub handle: String,
    pub topics: Vec<String>,
}

/// Bipartite graph linking authors to their topics.
#[must_use]
pub fn author_network(authors: &[AuthorTopics]) -> Value {
    let mut labels: Vec<String> = Vec::new();
    let mut nodes: Vec<Value> = Vec::new();
    let mut edges: Vec<Value> = Vec::new();

    for author in authors {
        let handle = format!("@{}", author.handle.trim_start_matches('@'));
        let source = intern_node(&mut labels, &mut nodes, handle, "author");
        for topic in &author.topics {
            let target = intern_node(&mut labels, &mut nodes, format!("#{topic}"), "topic");
            edges.push(json!({ "source": source, "target": target }));
        }
    }

    json!({
        "type": "forceDirectedGraph",
        "data": {
            "labels": labels,
            "datasets": [{ "data": nodes, "edges": edges }]
        },
        "options": base_options("Authors and topics")
    })
}

fn intern_node(labels: &mut Vec<String>, nodes: &mut Vec<Value>, name: String, kind: &str) -> usize {
    if let Some(i) = labels.iter().position(|l| *l == name) {
        return i;
    }
    labels.push(name);
    nodes.push(json!({ "kind": kind }));
    labels.len() - 1
}

/// Keywords sized by their cluster's volume.
#[must_use]
pub fn keyword_cloud(clusters: &[KeywordCluster]) -> Value {
    let weights: Vec<(&str, f64)> = clusters
        .iter()
        .flat_map(|c| {
            let share = match u32::try_from(c.keywords.len()) {
                Ok(0) | Err(_) => 0.0,
                Ok(n) => c.volume / f64::from(n),
            };
            c.keywords.iter().map(move |k| (k.as_str(), share))
        })
        .collect();
    let max = weights.iter().map(|(_, w)| *w).fold(0.0_f64, f64::max);

    let labels: Vec<&str> = weights.iter().map(|(k, _)| *k).collect();
    let sizes: Vec<f64> = weights
        .iter()
        .map(|(_, w)| {
            if max > 0.0 {
                (WORD_MIN_SIZE + (WORD_MAX_SIZE - WORD_MIN_SIZE) * w / max).round()
            } else {
                WORD_MIN_SIZE
            }
        })
        .collect();

    json!({
        "type": "wordCloud",
        "data": { "labels": labels, "datasets": [{ "label": "Keywords", "data": sizes }] },
        "options": base_options("Keyword cloud")
    })
}

/// Share of voice as overlapping sets: each brand's keyword mentions, and for
/// every pair the mentions they share across clusters.
#[must_use]
pub fn share_of_voice_venn(clusters: &[KeywordCluster]) -> Value {
    let brand_names: Vec<&str> = brands_in_order(
        clusters
            .iter()
            .filter_map(|c| c.brands.as_ref())
            .flat_map(|m| m.iter().map(|(b, _)| b)),
    );

    let mentions = |brand: &str, cluster: &KeywordCluster| {
        cluster
            .brands
            .as_ref()
            .and_then(|m| m.get(brand))
            .copied()
            .unwrap_or(0.0)
    };

    let mut sets: Vec<Value> = brand_names
        .iter()
        .map(|&b| {
            let total: f64 = clusters.iter().map(|c| mentions(b, c)).sum();
            json!({ "sets": [b], "value": total })
        })
        .collect();

    for (i, &a) in brand_names.iter().enumerate() {
        for &b in &brand_names[i + 1..] {
            let shared: f64 = clusters
                .iter()
                .map(|c| mentions(a, c).min(mentions(b, c)))
                .sum();
            if shared > 0.0 {
                sets.push(json!({ "sets": [a, b], "value": shared }));
            }
        }
    }

    json!({
        "type": "venn",
        "data": { "labels": brand_names, "datasets": [{ "label": "Share of voice", "data": sets }] },
        "options": base_options("Share of voice overlap")
    })
}

/// Unique names in first-seen order.
fn brands_in_order<'a>(names: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for name in names {
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// A chart with a caption, for per-brand and per-platform chart lists.
#[derive(Debug, Clone, Serialize)]
pub struct NamedChart {
    pub name: String,
    pub spec: Value,
}

/// Every chart of a report. Optional charts are `None` when their data is
/// absent, invalid, or empty.
#[derive(Debug, Clone, Serialize)]
pub struct ReportCharts {
    pub equity_radar: Option<Value>,
    pub equity_bar: Option<Value>,
    pub audience_bar: Option<Value>,
    pub audience_scatter: Option<Value>,
    pub audience_sankey: Option<Value>,
    pub voice_comparison: Option<Value>,
    pub voice_ratio: Option<Value>,
    pub channel_pie: Option<Value>,
    pub sentiment_pie: Option<Value>,
    pub post_types: Vec<NamedChart>,
    pub timing: Vec<NamedChart>,
    pub heatmaps: Vec<NamedChart>,
    pub keyword_cloud: Option<Value>,
    pub share_of_voice_venn: Option<Value>,
    pub author_network: Option<Value>,
}

/// Builds every chart for `report`, threading one palette through all of them.
pub fn build_charts(
    report: &ShapedReport,
    authors: &[AuthorTopics],
    palette: &mut BrandPalette,
) -> ReportCharts {
    let equity = report.brand_equity.items();
    let voice = &report.voice_rows;
    let clusters = report.keyword_clusters.items();
    let has_venn_data = clusters
        .iter()
        .any(|c| c.brands.as_ref().is_some_and(|m| !m.is_empty()));

    let focus_timing = report.focus_timing();
    let timing = focus_timing
        .map(|t| {
            t.platforms
                .iter()
                .map(|(platform, data)| NamedChart {
                    name: Platform::label_for(platform),
                    spec: timing_line(&t.brand, platform, data, palette),
                })
                .collect()
        })
        .unwrap_or_default();
    let heatmaps = focus_timing
        .map(|t| {
            t.platforms
                .iter()
                .map(|(platform, data)| NamedChart {
                    name: Platform::label_for(platform),
                    spec: timing_heatmap(&t.brand, platform, data),
                })
                .collect()
        })
        .unwrap_or_default();

    ReportCharts {
        equity_radar: (!equity.is_empty()).then(|| equity_radar(equity, palette)),
        equity_bar: (!equity.is_empty()).then(|| equity_bar(equity, palette)),
        audience_bar: (!report.audience.is_empty())
            .then(|| audience_bar(&report.audience, &report.platforms, palette)),
        audience_scatter: (!report.audience.is_empty())
            .then(|| audience_scatter(&report.audience, palette)),
        audience_sankey: (!report.audience.is_empty())
            .then(|| audience_sankey(&report.audience, palette)),
        voice_comparison: (!voice.is_empty()).then(|| voice_comparison(voice, palette)),
        voice_ratio: (!voice.is_empty()).then(|| voice_ratio(voice, palette)),
        channel_pie: (!report.channel_totals.is_empty())
            .then(|| channel_pie(&report.channel_totals)),
        sentiment_pie: report
            .sentiment
            .as_ref()
            .filter(|s| s.counts.total() > 0)
            .map(|s| sentiment_pie(&s.counts)),
        post_types: report
            .post_type_engagement
            .items()
            .iter()
            .filter(|e| !e.types.is_empty())
            .map(|e| NamedChart {
                name: e.brand.clone(),
                spec: post_type_bar(e, palette),
            })
            .collect(),
        timing,
        heatmaps,
        keyword_cloud: (!clusters.is_empty()).then(|| keyword_cloud(clusters)),
        share_of_voice_venn: has_venn_data.then(|| share_of_voice_venn(clusters)),
        author_network: (!authors.is_empty()).then(|| author_network(authors)),
    }
}

#[cfg(test)]
#[path = "charts_test.rs"]
mod tests;
