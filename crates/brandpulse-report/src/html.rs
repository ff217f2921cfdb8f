//! Self-contained HTML page rendered by headless Chromium for the PDF export.
//!
//! The page pulls the chart library from a script tag and inlines every chart
//! configuration. Only chart types the core library draws natively are
//! embedded; plugin types (heatmap, sankey, network, word cloud, venn) stay
//! API-only.

use std::fmt::Write as _;

use brandpulse_core::format_number;
use serde_json::{json, Value};

use crate::charts::{NamedChart, ReportCharts};
use crate::fields::count;
use crate::model::{Insights, KeywordCluster};
use crate::shaper::ShapedReport;

/// Element id prefix for chart canvases.
const CANVAS_PREFIX: &str = "chart-";

const STYLE: &str = r"
* { box-sizing: border-box; }
body { font-family: 'Helvetica Neue', Arial, sans-serif; color: #0F172A; margin: 32px; background: #FFFFFF; }
header { border-bottom: 3px solid #6366F1; margin-bottom: 24px; padding-bottom: 12px; }
h1 { font-size: 28px; margin: 0 0 8px; }
h2 { font-size: 20px; margin: 28px 0 12px; page-break-after: avoid; }
.meta { color: #475569; font-size: 13px; margin: 2px 0; }
.grid { display: grid; grid-template-columns: 1fr 1fr; gap: 16px; }
.chart { border: 1px solid #E2E8F0; border-radius: 8px; padding: 12px; page-break-inside: avoid; }
.chart h3 { font-size: 14px; margin: 0 0 8px; color: #334155; }
.chart .frame { position: relative; height: 280px; }
.summary { background: #F8FAFC; border-left: 4px solid #6366F1; padding: 12px 16px; }
.summary li { margin: 4px 0; }
.cards { display: grid; grid-template-columns: repeat(3, 1fr); gap: 12px; }
.card { border: 1px solid #E2E8F0; border-radius: 8px; padding: 12px; page-break-inside: avoid; }
.card h3 { font-size: 15px; margin: 0 0 4px; }
.card .volume { color: #6366F1; font-weight: 600; font-size: 13px; }
.chip { display: inline-block; background: #EEF2FF; color: #3730A3; border-radius: 12px; padding: 2px 8px; margin: 3px 3px 0 0; font-size: 12px; }
";

/// Escapes text for an HTML text node or quoted attribute.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Serializes `value` for embedding inside a `<script>` element.
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

#[derive(Default)]
struct Page {
    body: String,
    charts: Vec<Value>,
}

impl Page {
    fn canvas(&mut self, caption: &str, spec: &Value) {
        let id = format!("{CANVAS_PREFIX}{}", self.charts.len());
        let _ = write!(
            self.body,
            r#"<div class="chart"><h3>{}</h3><div class="frame"><canvas id="{id}"></canvas></div></div>"#,
            escape_html(caption)
        );
        self.charts.push(json!({ "id": id, "config": spec }));
    }

    /// Adds a titled grid of charts; skipped entirely when `charts` is empty.
    fn section(&mut self, title: &str, charts: &[(&str, &Value)]) {
        if charts.is_empty() {
            return;
        }
        let _ = write!(self.body, "<section><h2>{}</h2><div class=\"grid\">", escape_html(title));
        for (caption, spec) in charts {
            self.canvas(caption, spec);
        }
        self.body.push_str("</div></section>");
    }

    fn named_section(&mut self, title: &str, charts: &[NamedChart]) {
        let pairs: Vec<(&str, &Value)> =
            charts.iter().map(|c| (c.name.as_str(), &c.spec)).collect();
        self.section(title, &pairs);
    }
}

/// Builds the printable report page.
#[must_use]
pub fn build_report_html(report: &ShapedReport, charts: &ReportCharts, chart_js_url: &str) -> String {
    let mut page = Page::default();
    let meta = &report.meta;

    let _ = write!(page.body, "<header><h1>{}</h1>", escape_html(&meta.title));
    if let Some(focus) = &meta.focus_brand {
        let _ = write!(page.body, r#"<p class="meta">Focus brand: {}</p>"#, escape_html(focus));
    }
    if !meta.competitors.is_empty() {
        let _ = write!(
            page.body,
            r#"<p class="meta">Competitors: {}</p>"#,
            escape_html(&meta.competitors.join(", "))
        );
    }
    if let Some(keywords) = &meta.universe_keywords {
        let _ = write!(page.body, r#"<p class="meta">Universe keywords: {}</p>"#, escape_html(keywords));
    }
    let completed = meta.completed_at.unwrap_or(meta.created_at);
    let _ = write!(
        page.body,
        r#"<p class="meta">Generated from analysis completed {}</p></header>"#,
        completed.format("%Y-%m-%d %H:%M UTC")
    );

    write_insights(&mut page.body, report.insights.as_ref());

    let equity: Vec<(&str, &Value)> = [
        ("Equity profile", charts.equity_radar.as_ref()),
        ("Overall equity score", charts.equity_bar.as_ref()),
    ]
    .into_iter()
    .filter_map(|(caption, spec)| spec.map(|s| (caption, s)))
    .collect();
    page.section("Brand equity", &equity);

    let audience: Vec<(&str, &Value)> = [
        ("Followers by platform", charts.audience_bar.as_ref()),
        ("Followers vs engagement", charts.audience_scatter.as_ref()),
    ]
    .into_iter()
    .filter_map(|(caption, spec)| spec.map(|s| (caption, s)))
    .collect();
    page.section("Audience", &audience);

    let voice: Vec<(&str, &Value)> = [
        ("Owned vs earned", charts.voice_comparison.as_ref()),
        ("Voice ratio", charts.voice_ratio.as_ref()),
    ]
    .into_iter()
    .filter_map(|(caption, spec)| spec.map(|s| (caption, s)))
    .collect();
    page.section("Share of voice", &voice);

    let mix: Vec<(&str, &Value)> = [
        ("Posts by channel", charts.channel_pie.as_ref()),
        ("Comment sentiment", charts.sentiment_pie.as_ref()),
    ]
    .into_iter()
    .filter_map(|(caption, spec)| spec.map(|s| (caption, s)))
    .collect();
    page.section("Channel mix and sentiment", &mix);

    page.named_section("Post type engagement", &charts.post_types);
    page.named_section("Posting times", &charts.timing);

    write_keyword_cards(&mut page.body, report.keyword_clusters.items());

    let configs = Value::Array(page.charts);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{STYLE}</style>
<script src="{script}"></script>
</head>
<body>
{body}
<script>
Chart.defaults.animation = false;
Chart.defaults.maintainAspectRatio = false;
const charts = {configs};
for (const c of charts) {{
  new Chart(document.getElementById(c.id), c.config);
}}
</script>
</body>
</html>
"#,
        title = escape_html(&meta.title),
        script = escape_html(chart_js_url),
        body = page.body,
        configs = script_json(&configs),
    )
}

fn write_insights(body: &mut String, insights: Option<&Insights>) {
    let Some(insights) = insights else {
        return;
    };
    body.push_str(r#"<section><h2>Executive summary</h2><div class="summary">"#);
    match insights {
        Insights::Structured(s) => {
            if let Some(summary) = &s.executive_summary {
                let _ = write!(body, "<p>{}</p>", escape_html(summary));
            }
            for (title, items) in [
                ("Recommendations", &s.recommendations),
                ("Opportunities", &s.opportunities),
                ("Risks", &s.risks),
            ] {
                if items.is_empty() {
                    continue;
                }
                let _ = write!(body, "<h3>{title}</h3><ul>");
                for item in items {
                    let _ = write!(body, "<li>{}</li>", escape_html(item));
                }
                body.push_str("</ul>");
            }
        }
        Insights::PlainText(text) => {
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                let _ = write!(body, "<p>{}</p>", escape_html(line));
            }
        }
    }
    body.push_str("</div></section>");
}

fn write_keyword_cards(body: &mut String, clusters: &[KeywordCluster]) {
    if clusters.is_empty() {
        return;
    }
    body.push_str(r#"<section><h2>Keyword clusters</h2><div class="cards">"#);
    for cluster in clusters {
        let _ = write!(
            body,
            r#"<div class="card"><h3>{}</h3><div class="volume">{} mentions</div><div>"#,
            escape_html(&cluster.label),
            format_number(count(cluster.volume))
        );
        for keyword in &cluster.keywords {
            let _ = write!(body, r#"<span class="chip">{}</span>"#, escape_html(keyword));
        }
        body.push_str("</div></div>");
    }
    body.push_str("</div></section>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::build_charts;
    use crate::shaper::shape;
    use crate::test_support::{full_result, sample_bundle};
    use brandpulse_core::BrandPalette;
    use brandpulse_db::AnalysisResultRow;

    const CHART_JS: &str = "https://cdn.example/chart.umd.min.js";

    fn render(result: Option<AnalysisResultRow>) -> String {
        let report = shape(&sample_bundle(result));
        let mut palette = BrandPalette::new(report.meta.focus_brand.as_deref());
        let charts = build_charts(&report, &[], &mut palette);
        build_report_html(&report, &charts, CHART_JS)
    }

    #[test]
    fn loads_chart_library_and_inlines_configs() {
        let html = render(Some(full_result()));
        assert!(html.contains(r#"<script src="https://cdn.example/chart.umd.min.js"></script>"#));
        assert!(html.contains(r#"<canvas id="chart-0">"#));
        assert!(html.contains(r#""type":"radar""#));
        assert!(html.contains("Keyword clusters"));
        assert!(html.contains("Flavour"));
    }

    #[test]
    fn plugin_chart_types_are_not_embedded() {
        let html = render(Some(full_result()));
        for plugin in ["\"matrix\"", "\"sankey\"", "\"wordCloud\"", "\"venn\"", "\"forceDirectedGraph\""] {
            assert!(!html.contains(plugin), "{plugin} should not be embedded");
        }
    }

    #[test]
    fn absent_optional_sections_are_omitted() {
        let html = render(Some(AnalysisResultRow {
            keyword_clustering: None,
            voice_analysis: None,
            post_timing_data: None,
            ..full_result()
        }));
        assert!(!html.contains("Keyword clusters"));
        assert!(!html.contains("Share of voice"));
        assert!(!html.contains("Posting times"));
        assert!(html.contains("Brand equity"));
    }

    #[test]
    fn session_without_result_still_renders_header() {
        let html = render(None);
        assert!(html.contains("<h1>Acme vs Rival: Q1</h1>"));
        assert!(!html.contains("Brand equity"));
        assert!(html.contains(r#""type":"doughnut""#));
    }

    #[test]
    fn escapes_text_and_script_payloads() {
        assert_eq!(escape_html(r#"<b>"A&B"</b>"#), "&lt;b&gt;&quot;A&amp;B&quot;&lt;/b&gt;");
        let value = json!({ "label": "</script><script>alert(1)" });
        assert!(!script_json(&value).contains("</script>"));
    }
}
