//! Report shaping, chart configuration, and DOCX/PDF/JSON exports.

pub mod charts;
pub mod docx;
pub mod error;
pub mod export;
pub mod fields;
pub mod html;
pub mod model;
pub mod pdf;
pub mod shaper;

#[cfg(test)]
mod test_support;

pub use charts::{build_charts, AuthorTopics, NamedChart, ReportCharts};
pub use docx::{render_docx, MAX_DOCX_AUTHORS};
pub use error::ReportError;
pub use export::{
    docx_export, export_filename, export_filename_today, pdf_export, pdf_exportable, raw_export,
    report_view, result_payloads, ReportView,
};
pub use fields::JsonField;
pub use html::build_report_html;
pub use model::Insights;
pub use pdf::{ChromiumRenderer, PdfRenderer};
pub use shaper::{shape, ShapedReport};
