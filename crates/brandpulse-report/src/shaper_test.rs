use super::*;
use crate::model::Insights;
use crate::test_support::{full_result, sample_bundle};
use brandpulse_db::AnalysisResultRow;

#[test]
fn audience_flattens_to_tuples_in_document_order() {
    let report = shape(&sample_bundle(Some(full_result())));

    let tuples: Vec<(&str, &str, f64)> = report
        .audience
        .iter()
        .map(|t| (t.brand.as_str(), t.platform.as_str(), t.followers))
        .collect();
    assert_eq!(
        tuples,
        vec![
            ("Acme", "instagram", 12_000.0),
            ("Acme", "tiktok", 8_000.0),
            ("Rival", "tiktok", 20_000.0),
            ("Rival", "youtube", 1_500.0),
        ]
    );
}

#[test]
fn platforms_are_deduplicated_in_first_seen_order() {
    let report = shape(&sample_bundle(Some(full_result())));
    assert_eq!(report.platforms, vec!["instagram", "tiktok", "youtube"]);
}

#[test]
fn channel_totals_sum_across_brands() {
    let report = shape(&sample_bundle(Some(full_result())));
    let totals: Vec<(&str, f64)> = report
        .channel_totals
        .iter()
        .map(|t| (t.platform.as_str(), t.posts))
        .collect();
    assert_eq!(totals, vec![("instagram", 40.0), ("tiktok", 35.0), ("youtube", 5.0)]);
}

#[test]
fn voice_ratio_is_none_without_owned_posts() {
    let report = shape(&sample_bundle(Some(full_result())));
    assert_eq!(report.voice_rows[0].voice_ratio, Some(3.0));
    assert_eq!(report.voice_rows[1].voice_ratio, None);
}

#[test]
fn sentiment_percentages_come_from_counts() {
    let report = shape(&sample_bundle(None));
    let sentiment = report.sentiment.expect("comments present");
    assert!((sentiment.positive_percent - 60.0).abs() < f64::EPSILON);
    assert!((sentiment.neutral_percent - 25.0).abs() < f64::EPSILON);
    assert!((sentiment.negative_percent - 15.0).abs() < f64::EPSILON);
}

#[test]
fn zero_sentiment_counts_give_zero_percent() {
    let mut bundle = sample_bundle(None);
    if let Some(c) = bundle.comments.as_mut() {
        c.positive_count = 0;
        c.neutral_count = 0;
        c.negative_count = 0;
    }
    let sentiment = shape(&bundle).sentiment.expect("comments present");
    assert_eq!(sentiment.positive_percent, 0.0);
    assert!(!sentiment.negative_percent.is_nan());
}

#[test]
fn malformed_audience_is_invalid_and_omitted() {
    let result = AnalysisResultRow {
        audience_comparison: Some("{broken".to_string()),
        ..full_result()
    };
    let report = shape(&sample_bundle(Some(result)));

    assert!(report.audience_comparison.is_invalid());
    assert!(report.audience.is_empty());
    assert!(report.platforms.is_empty());
    // Other sections are unaffected.
    assert_eq!(report.brand_equity.items().len(), 2);
}

#[test]
fn optional_sections_absent_when_columns_missing() {
    let result = AnalysisResultRow {
        keyword_clustering: None,
        voice_analysis: None,
        post_timing_data: None,
        ..full_result()
    };
    let report = shape(&sample_bundle(Some(result)));

    assert!(matches!(report.keyword_clusters, JsonField::Absent));
    assert!(report.voice_rows.is_empty());
    assert!(report.focus_timing().is_none());
}

#[test]
fn plain_text_insights_are_kept() {
    let result = AnalysisResultRow {
        ai_insights: Some("Keep doing what works.".to_string()),
        ..full_result()
    };
    let report = shape(&sample_bundle(Some(result)));
    assert_eq!(
        report.insights,
        Some(Insights::PlainText("Keep doing what works.".to_string()))
    );
}

#[test]
fn meta_lists_focus_then_competitors() {
    let report = shape(&sample_bundle(None));
    assert_eq!(report.meta.focus_brand.as_deref(), Some("Acme"));
    assert_eq!(report.meta.competitors, vec!["Rival"]);
    assert!(!report.has_result);
    assert_eq!(report.brand_metrics[0].platform, "Instagram");
}

#[test]
fn focus_timing_matches_focus_brand() {
    let report = shape(&sample_bundle(Some(full_result())));
    let timing = report.focus_timing().expect("focus timing");
    assert_eq!(timing.brand, "Acme");
    assert_eq!(timing.platforms.iter().count(), 2);
}

#[test]
fn null_numbers_degrade_single_values_not_sections() {
    let result = AnalysisResultRow {
        audience_comparison: Some(
            r#"[{"brand":"Acme","platforms":{
                "instagram":{"followers":null,"engagementRate":null},
                "tiktok":{"followers":900,"engagementRate":2.5}}}]"#
                .to_string(),
        ),
        brand_equity: Some(
            r#"[{"brand":"Acme","reach":null,"engagement":80,"velocity":60,"overall":null}]"#
                .to_string(),
        ),
        voice_analysis: Some(
            r#"[{"brand":"Acme","ownedPosts":null,"earnedMentions":30}]"#.to_string(),
        ),
        ..full_result()
    };
    let report = shape(&sample_bundle(Some(result)));

    assert!(!report.audience_comparison.is_invalid());
    let tuples: Vec<(&str, f64, Option<f64>)> = report
        .audience
        .iter()
        .map(|t| (t.platform.as_str(), t.followers, t.engagement_rate))
        .collect();
    assert_eq!(
        tuples,
        vec![("instagram", 0.0, None), ("tiktok", 900.0, Some(2.5))]
    );

    let equity = report.brand_equity.items();
    assert_eq!(equity.len(), 1);
    assert_eq!(equity[0].reach, 0.0);
    assert_eq!(equity[0].engagement, 80.0);

    assert_eq!(report.voice_rows.len(), 1);
    assert_eq!(report.voice_rows[0].voice_ratio, None);
}
