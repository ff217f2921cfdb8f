use super::*;
use crate::shaper::shape;
use crate::test_support::{full_result, sample_bundle};
use brandpulse_core::palette::FOCUS_COLOR;
use brandpulse_db::AnalysisResultRow;

fn report() -> ShapedReport {
    shape(&sample_bundle(Some(full_result())))
}

#[test]
fn radar_has_one_dataset_per_brand_with_focus_colour() {
    let report = report();
    let mut palette = BrandPalette::new(Some("Acme"));
    let spec = equity_radar(report.brand_equity.items(), &mut palette);

    assert_eq!(spec["type"], "radar");
    let datasets = spec["data"]["datasets"].as_array().unwrap();
    assert_eq!(datasets.len(), 2);
    assert_eq!(datasets[0]["borderColor"], FOCUS_COLOR);
    // Missing sentiment plots as 0.
    assert_eq!(datasets[1]["data"][3], 0.0);
}

#[test]
fn colours_stay_consistent_across_charts() {
    let report = report();
    let mut palette = BrandPalette::new(Some("Acme"));
    let bar = equity_bar(report.brand_equity.items(), &mut palette);
    let audience = audience_bar(&report.audience, &report.platforms, &mut palette);

    let rival_in_bar = bar["data"]["datasets"][0]["backgroundColor"][1].clone();
    let rival_in_audience = audience["data"]["datasets"][1]["backgroundColor"].clone();
    assert_eq!(rival_in_bar, rival_in_audience);
    assert_ne!(rival_in_bar, FOCUS_COLOR);
}

#[test]
fn audience_bar_fills_missing_platforms_with_zero() {
    let report = report();
    let mut palette = BrandPalette::new(Some("Acme"));
    let spec = audience_bar(&report.audience, &report.platforms, &mut palette);

    assert_eq!(
        spec["data"]["labels"],
        serde_json::json!(["Instagram", "TikTok", "YouTube"])
    );
    assert_eq!(spec["data"]["datasets"][0]["data"], serde_json::json!([12000.0, 8000.0, 0.0]));
    assert_eq!(spec["data"]["datasets"][1]["data"], serde_json::json!([0.0, 20000.0, 1500.0]));
}

#[test]
fn voice_ratio_plots_gaps_for_zero_owned() {
    let report = report();
    let mut palette = BrandPalette::new(Some("Acme"));
    let spec = voice_ratio(&report.voice_rows, &mut palette);
    assert_eq!(spec["data"]["datasets"][0]["data"], serde_json::json!([3.0, null]));
}

#[test]
fn heatmap_derives_grid_when_missing() {
    let timing = PlatformTiming {
        by_hour: {
            let mut hours = vec![0.0; 24];
            hours[9] = 1.0;
            hours
        },
        by_day: vec![7.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0],
        grid: None,
    };
    let spec = timing_heatmap("Acme", "instagram", &timing);
    let cells = spec["data"]["datasets"][0]["data"].as_array().unwrap();
    assert_eq!(cells.len(), 7 * 24);
    let hot = cells
        .iter()
        .find(|c| c["y"] == "Mon" && c["x"] == 9)
        .unwrap();
    assert_eq!(hot["v"], 7.0);
    assert_eq!(spec["data"]["datasets"][0]["maxValue"], 7.0);
}

#[test]
fn sankey_skips_zero_flows() {
    let tuples = vec![
        AudienceTuple {
            brand: "Acme".to_string(),
            platform: "instagram".to_string(),
            followers: 10.0,
            engagement_rate: None,
        },
        AudienceTuple {
            brand: "Acme".to_string(),
            platform: "tiktok".to_string(),
            followers: 0.0,
            engagement_rate: None,
        },
    ];
    let mut palette = BrandPalette::new(Some("Acme"));
    let spec = audience_sankey(&tuples, &mut palette);
    let flows = spec["data"]["datasets"][0]["data"].as_array().unwrap();
    assert_eq!(flows.len(), 1);
    assert_eq!(flows[0]["to"], "Instagram");
    assert_eq!(spec["data"]["datasets"][0]["colors"]["Acme"], FOCUS_COLOR);
}

#[test]
fn network_shares_topic_nodes_between_authors() {
    let authors = vec![
        AuthorTopics {
            handle: "@jo".to_string(),
            topics: vec!["coffee".to_string(), "travel".to_string()],
        },
        AuthorTopics {
            handle: "sam".to_string(),
            topics: vec!["coffee".to_string()],
        },
    ];
    let spec = author_network(&authors);
    assert_eq!(
        spec["data"]["labels"],
        serde_json::json!(["@jo", "#coffee", "#travel", "@sam"])
    );
    let edges = spec["data"]["datasets"][0]["edges"].as_array().unwrap();
    assert_eq!(edges.len(), 3);
    assert_eq!(edges[2], serde_json::json!({ "source": 3, "target": 1 }));
}

#[test]
fn word_cloud_scales_sizes_to_volume() {
    let report = report();
    let spec = keyword_cloud(report.keyword_clusters.items());
    assert_eq!(
        spec["data"]["labels"],
        serde_json::json!(["bold", "smooth", "expensive"])
    );
    let sizes = spec["data"]["datasets"][0]["data"].as_array().unwrap();
    assert_eq!(sizes[0], WORD_MAX_SIZE);
    assert!(sizes[2].as_f64().unwrap() < WORD_MAX_SIZE);
}

#[test]
fn venn_reports_pairwise_overlap() {
    let report = report();
    let spec = share_of_voice_venn(report.keyword_clusters.items());
    let sets = spec["data"]["datasets"][0]["data"].as_array().unwrap();
    assert_eq!(sets[0], serde_json::json!({ "sets": ["Acme"], "value": 300.0 }));
    assert_eq!(sets[2], serde_json::json!({ "sets": ["Acme", "Rival"], "value": 120.0 }));
}

#[test]
fn build_charts_omits_sections_without_data() {
    let result = AnalysisResultRow {
        keyword_clustering: None,
        voice_analysis: None,
        post_timing_data: None,
        ..full_result()
    };
    let report = shape(&sample_bundle(Some(result)));
    let mut palette = BrandPalette::new(report.meta.focus_brand.as_deref());
    let charts = build_charts(&report, &[], &mut palette);

    assert!(charts.equity_radar.is_some());
    assert!(charts.voice_comparison.is_none());
    assert!(charts.voice_ratio.is_none());
    assert!(charts.keyword_cloud.is_none());
    assert!(charts.share_of_voice_venn.is_none());
    assert!(charts.timing.is_empty());
    assert!(charts.author_network.is_none());
    assert_eq!(charts.post_types.len(), 2);
}

#[test]
fn build_charts_has_one_timing_chart_per_focus_platform() {
    let report = report();
    let mut palette = BrandPalette::new(Some("Acme"));
    let charts = build_charts(&report, &[], &mut palette);
    let names: Vec<&str> = charts.timing.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Instagram", "TikTok"]);
    assert_eq!(charts.heatmaps.len(), 2);
    assert!(charts.sentiment_pie.is_some());
}
