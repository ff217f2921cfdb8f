//! Entry points shared by the HTTP exports and the CLI.

use brandpulse_core::{BrandPalette, Platform, SessionStatus};
use brandpulse_db::{AnalysisResultRow, AuthorProfileRow, SessionBundle};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::charts::{build_charts, AuthorTopics, ReportCharts};
use crate::docx::render_docx;
use crate::error::ReportError;
use crate::fields::JsonField;
use crate::html::build_report_html;
use crate::model::parse_author_topics;
use crate::pdf::PdfRenderer;
use crate::shaper::{shape, ShapedReport};

/// `"Q1: Acme/Rival"` on 2026-03-02 becomes `Q1__Acme_Rival_2026-03-02.pdf`.
#[must_use]
pub fn export_filename(title: &str, extension: &str, date: NaiveDate) -> String {
    let stem: String = title
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{stem}_{}.{extension}", date.format("%Y-%m-%d"))
}

/// [`export_filename`] stamped with today's UTC date.
#[must_use]
pub fn export_filename_today(title: &str, extension: &str) -> String {
    export_filename(title, extension, Utc::now().date_naive())
}

/// A PDF needs a completed session with a stored result.
#[must_use]
pub fn pdf_exportable(bundle: &SessionBundle) -> bool {
    bundle.session.parsed_status() == SessionStatus::Completed && bundle.result.is_some()
}

/// Shaped data plus chart configurations, as served to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct ReportView {
    pub report: ShapedReport,
    pub charts: ReportCharts,
}

fn author_topics(authors: &[AuthorProfileRow]) -> Vec<AuthorTopics> {
    authors
        .iter()
        .map(|a| AuthorTopics {
            handle: a.handle.clone(),
            topics: parse_author_topics(a.categories.as_deref()),
        })
        .collect()
}

/// Shapes `bundle` and builds every chart with one palette.
#[must_use]
pub fn report_view(bundle: &SessionBundle, authors: &[AuthorProfileRow]) -> ReportView {
    let report = shape(bundle);
    let mut palette = BrandPalette::new(report.meta.focus_brand.as_deref());
    let charts = build_charts(&report, &author_topics(authors), &mut palette);
    ReportView { report, charts }
}

/// Builds the DOCX document for `bundle`.
///
/// # Errors
///
/// Returns [`ReportError::Docx`] if the package cannot be written.
pub fn docx_export(
    bundle: &SessionBundle,
    authors: &[AuthorProfileRow],
) -> Result<Vec<u8>, ReportError> {
    render_docx(&shape(bundle), authors)
}

/// Builds the report page and prints it through `renderer`.
///
/// Callers check [`pdf_exportable`] first; absent sections are simply left out.
///
/// # Errors
///
/// Returns any [`ReportError`] raised by the renderer.
pub async fn pdf_export(
    bundle: &SessionBundle,
    renderer: &dyn PdfRenderer,
    chart_js_url: &str,
) -> Result<Vec<u8>, ReportError> {
    let view = report_view(bundle, &[]);
    let html = build_report_html(&view.report, &view.charts, chart_js_url);
    renderer.render(&html).await
}

fn payload(raw: Option<&str>) -> Value {
    match JsonField::<Value>::parse(raw) {
        JsonField::Absent => Value::Null,
        JsonField::Parsed(value) => value,
        JsonField::Invalid { raw, .. } => Value::String(raw),
    }
}

/// Every payload column of `result`, parsed where possible.
///
/// A payload that is not valid JSON is kept as its raw string.
#[must_use]
pub fn result_payloads(result: &AnalysisResultRow) -> Value {
    json!({
        "audience_comparison": payload(result.audience_comparison.as_deref()),
        "post_channel_distribution": payload(result.post_channel_distribution.as_deref()),
        "hashtag_analysis": payload(result.hashtag_analysis.as_deref()),
        "post_type_engagement": payload(result.post_type_engagement.as_deref()),
        "post_timing_data": payload(result.post_timing_data.as_deref()),
        "brand_equity": payload(result.brand_equity.as_deref()),
        "keyword_clustering": payload(result.keyword_clustering.as_deref()),
        "voice_analysis": payload(result.voice_analysis.as_deref()),
        "ai_insights": payload(result.ai_insights.as_deref()),
        "additional_metrics": payload(result.additional_metrics.as_deref()),
        "created_at": result.created_at,
    })
}

/// Every stored field of the session, payloads parsed via [`result_payloads`].
#[must_use]
pub fn raw_export(bundle: &SessionBundle) -> Value {
    let session = &bundle.session;

    let brands: Vec<Value> = bundle
        .brands
        .iter()
        .map(|b| {
            let handles: Map<String, Value> = Platform::ALL
                .iter()
                .filter_map(|p| {
                    b.brand
                        .handle(*p)
                        .map(|h| (p.as_str().to_string(), Value::String(h.to_string())))
                })
                .collect();
            let data: Vec<Value> = b
                .data
                .iter()
                .map(|d| {
                    json!({
                        "platform": d.platform,
                        "followers": d.followers,
                        "post_count": d.post_count,
                        "engagement_rate": d.engagement_rate,
                        "posting_frequency": d.posting_frequency,
                        "raw_data": d.raw_data,
                        "scraped_data": d.scraped_data,
                        "collected_at": d.collected_at,
                    })
                })
                .collect();
            json!({
                "name": b.brand.name,
                "role": b.brand.role,
                "website": b.brand.website,
                "handles": handles,
                "data": data,
            })
        })
        .collect();

    let result = bundle.result.as_ref().map(result_payloads);

    let comments = bundle.comments.as_ref().map(|c| {
        json!({
            "positive_count": c.positive_count,
            "neutral_count": c.neutral_count,
            "negative_count": c.negative_count,
            "ai_summary": c.ai_summary,
            "ai_recommendations": c.ai_recommendations,
        })
    });

    json!({
        "session": {
            "id": session.id,
            "title": session.title,
            "status": session.parsed_status(),
            "universe_keywords": session.universe_keywords,
            "created_at": session.created_at,
            "completed_at": session.completed_at,
        },
        "brands": brands,
        "result": result,
        "comment_analysis": comments,
        "exported_at": Utc::now(),
    })
}
