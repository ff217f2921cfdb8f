//! Structured DOCX export.

use std::io::Cursor;

use brandpulse_core::{format_number, format_percent, Platform};
use brandpulse_db::AuthorProfileRow;
use chrono::{DateTime, Utc};
use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

use crate::error::ReportError;
use crate::fields::count;
use crate::model::{parse_author_topics, Insights};
use crate::shaper::ShapedReport;

/// Authors listed in the document.
pub const MAX_DOCX_AUTHORS: usize = 10;

const TITLE_SIZE: usize = 40;
const HEADING_SIZE: usize = 28;
const SUBHEADING_SIZE: usize = 24;

fn heading(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(HEADING_SIZE))
}

fn subheading(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text).bold().size(SUBHEADING_SIZE))
}

fn para(text: &str) -> Paragraph {
    Paragraph::new().add_run(Run::new().add_text(text))
}

fn labeled(label: &str, value: &str) -> Paragraph {
    Paragraph::new()
        .add_run(Run::new().add_text(format!("{label}: ")).bold())
        .add_run(Run::new().add_text(value))
}

fn bullet(text: &str) -> Paragraph {
    para(&format!("\u{2022} {text}"))
}

fn table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let header = TableRow::new(
        headers
            .iter()
            .map(|h| TableCell::new().add_paragraph(Paragraph::new().add_run(Run::new().add_text(*h).bold())))
            .collect(),
    );
    let body = rows.into_iter().map(|cells| {
        TableRow::new(
            cells
                .into_iter()
                .map(|c| TableCell::new().add_paragraph(para(&c)))
                .collect(),
        )
    });
    Table::new(std::iter::once(header).chain(body).collect())
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Renders the report as a DOCX package.
///
/// Sections whose data is absent or malformed are left out; the document is
/// still produced.
///
/// # Errors
///
/// Returns [`ReportError::Docx`] if the package cannot be written.
pub fn render_docx(
    report: &ShapedReport,
    authors: &[AuthorProfileRow],
) -> Result<Vec<u8>, ReportError> {
    let mut buffer = Cursor::new(Vec::new());
    build_document(report, authors)
        .build()
        .pack(&mut buffer)
        .map_err(|e| ReportError::Docx(e.to_string()))?;
    Ok(buffer.into_inner())
}

fn build_document(report: &ShapedReport, authors: &[AuthorProfileRow]) -> Docx {
    let meta = &report.meta;
    let mut doc = Docx::new()
        .add_paragraph(
            Paragraph::new().add_run(Run::new().add_text(&meta.title).bold().size(TITLE_SIZE)),
        )
        .add_paragraph(para("Social media competitive analysis"))
        .add_paragraph(labeled("Status", meta.status.as_str()))
        .add_paragraph(labeled("Created", &format_date(meta.created_at)));

    if let Some(completed) = meta.completed_at {
        doc = doc.add_paragraph(labeled("Completed", &format_date(completed)));
    }
    if let Some(focus) = &meta.focus_brand {
        doc = doc.add_paragraph(labeled("Focus brand", focus));
    }
    if !meta.competitors.is_empty() {
        doc = doc.add_paragraph(labeled("Competitors", &meta.competitors.join(", ")));
    }
    if let Some(keywords) = &meta.universe_keywords {
        doc = doc.add_paragraph(labeled("Universe keywords", keywords));
    }

    doc = add_insights(doc, report.insights.as_ref());
    doc = add_audience(doc, report);
    doc = add_equity(doc, report);
    doc = add_voice(doc, report);
    doc = add_keywords(doc, report);
    doc = add_sentiment(doc, report);
    add_authors(doc, authors)
}

fn add_insights(mut doc: Docx, insights: Option<&Insights>) -> Docx {
    let Some(insights) = insights else {
        return doc;
    };
    doc = doc.add_paragraph(heading("Executive summary"));
    match insights {
        Insights::Structured(s) => {
            if let Some(summary) = &s.executive_summary {
                doc = doc.add_paragraph(para(summary));
            }
            for (title, items) in [
                ("Recommendations", &s.recommendations),
                ("Opportunities", &s.opportunities),
                ("Risks", &s.risks),
            ] {
                if items.is_empty() {
                    continue;
                }
                doc = doc.add_paragraph(subheading(title));
                for item in items {
                    doc = doc.add_paragraph(bullet(item));
                }
            }
        }
        Insights::PlainText(text) => {
            for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
                doc = doc.add_paragraph(para(line));
            }
        }
    }
    doc
}

/// Left out entirely when the audience comparison is malformed or there is
/// nothing to list.
fn add_audience(doc: Docx, report: &ShapedReport) -> Docx {
    if report.audience_comparison.is_invalid() {
        return doc;
    }

    let rows: Vec<Vec<String>> = if report.brand_metrics.is_empty() {
        report
            .audience
            .iter()
            .map(|t| {
                vec![
                    t.brand.clone(),
                    Platform::label_for(&t.platform),
                    format_number(count(t.followers)),
                    t.engagement_rate.map_or_else(|| "n/a".to_string(), format_percent),
                ]
            })
            .collect()
    } else {
        report
            .brand_metrics
            .iter()
            .map(|m| {
                vec![
                    m.brand.clone(),
                    m.platform.clone(),
                    format_number(m.followers),
                    format_percent(m.engagement_rate),
                ]
            })
            .collect()
    };

    if rows.is_empty() {
        return doc;
    }
    doc.add_paragraph(heading("Audience metrics"))
        .add_table(table(&["Brand", "Platform", "Followers", "Engagement"], rows))
}

fn add_equity(doc: Docx, report: &ShapedReport) -> Docx {
    let equity = report.brand_equity.items();
    if equity.is_empty() {
        return doc;
    }
    let score = |v: f64| format!("{v:.0}");
    let rows = equity
        .iter()
        .map(|e| {
            vec![
                e.brand.clone(),
                score(e.reach),
                score(e.engagement),
                score(e.velocity),
                e.sentiment.map_or_else(|| "n/a".to_string(), score),
                score(e.overall),
            ]
        })
        .collect();
    doc.add_paragraph(heading("Brand equity")).add_table(table(
        &["Brand", "Reach", "Engagement", "Velocity", "Sentiment", "Overall"],
        rows,
    ))
}

fn add_voice(doc: Docx, report: &ShapedReport) -> Docx {
    if report.voice_rows.is_empty() {
        return doc;
    }
    let rows = report
        .voice_rows
        .iter()
        .map(|v| {
            vec![
                v.brand.clone(),
                format_number(count(v.owned_posts)),
                format_number(count(v.earned_mentions)),
                v.share_of_voice.map_or_else(|| "n/a".to_string(), format_percent),
                v.voice_ratio.map_or_else(|| "n/a".to_string(), |r| format!("{r:.2}")),
            ]
        })
        .collect();
    doc.add_paragraph(heading("Share of voice")).add_table(table(
        &["Brand", "Owned posts", "Earned mentions", "Share of voice", "Voice ratio"],
        rows,
    ))
}

fn add_keywords(mut doc: Docx, report: &ShapedReport) -> Docx {
    let clusters = report.keyword_clusters.items();
    if clusters.is_empty() {
        return doc;
    }
    doc = doc.add_paragraph(heading("Keyword clusters"));
    for cluster in clusters {
        doc = doc
            .add_paragraph(subheading(&format!(
                "{} ({} mentions)",
                cluster.label,
                format_number(count(cluster.volume))
            )))
            .add_paragraph(para(&cluster.keywords.join(", ")));
    }
    doc
}

fn add_sentiment(doc: Docx, report: &ShapedReport) -> Docx {
    let Some(sentiment) = &report.sentiment else {
        return doc;
    };
    let counts = &sentiment.counts;
    let line = |label: &str, n: u64, pct: f64| {
        labeled(
            label,
            &format!("{} ({})", format_number(i64::try_from(n).unwrap_or(i64::MAX)), format_percent(pct)),
        )
    };

    let mut doc = doc
        .add_paragraph(heading("Comment sentiment"))
        .add_paragraph(line("Positive", counts.positive, sentiment.positive_percent))
        .add_paragraph(line("Neutral", counts.neutral, sentiment.neutral_percent))
        .add_paragraph(line("Negative", counts.negative, sentiment.negative_percent));
    if let Some(summary) = &sentiment.ai_summary {
        doc = doc.add_paragraph(labeled("Summary", summary));
    }
    if let Some(recommendations) = &sentiment.ai_recommendations {
        doc = doc.add_paragraph(labeled("Recommendations", recommendations));
    }
    doc
}

fn add_authors(doc: Docx, authors: &[AuthorProfileRow]) -> Docx {
    if authors.is_empty() {
        return doc;
    }
    let rows = authors
        .iter()
        .take(MAX_DOCX_AUTHORS)
        .map(|a| {
            let topics = parse_author_topics(a.categories.as_deref());
            vec![
                a.display_name
                    .as_deref()
                    .map_or_else(|| a.handle.clone(), |n| format!("{n} ({})", a.handle)),
                Platform::label_for(&a.platform),
                format_number(a.followers),
                format_percent(a.engagement_rate),
                format!("{:.1}", a.collaboration_score),
                if topics.is_empty() {
                    "n/a".to_string()
                } else {
                    topics.join(", ")
                },
            ]
        })
        .collect();
    doc.add_paragraph(heading("Top authors")).add_table(table(
        &["Author", "Platform", "Followers", "Engagement", "Score", "Topics"],
        rows,
    ))
}
