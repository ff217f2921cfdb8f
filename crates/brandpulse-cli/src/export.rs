//! `export` command: writes a session's DOCX, PDF or raw JSON export to disk.

use std::path::{Path, PathBuf};

use brandpulse_core::AppConfig;
use brandpulse_report::{ChromiumRenderer, MAX_DOCX_AUTHORS};
use clap::ValueEnum;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Docx,
    Pdf,
    Json,
}

impl ExportFormat {
    pub(crate) fn extension(self) -> &'static str {
        match self {
            ExportFormat::Docx => "docx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Json => "json",
        }
    }
}

/// Resolve where the export is written: `out` when given, otherwise the
/// dated filename in the current directory.
pub(crate) fn output_path(out: Option<PathBuf>, title: &str, format: ExportFormat) -> PathBuf {
    out.unwrap_or_else(|| {
        PathBuf::from(brandpulse_report::export_filename_today(
            title,
            format.extension(),
        ))
    })
}

/// Build and write one export.
///
/// Exports run as an operator, so the session is loaded without an owner
/// filter.
///
/// # Errors
///
/// Returns an error if the session does not exist, a PDF is requested for a
/// session without a completed result, rendering fails, or the file cannot
/// be written.
pub(crate) async fn run_export(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    session_id: Uuid,
    format: ExportFormat,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let bundle = brandpulse_db::load_session_bundle(pool, session_id, None)
        .await?
        .ok_or_else(|| anyhow::anyhow!("session {session_id} not found"))?;

    let bytes = match format {
        ExportFormat::Docx => {
            let limit = i64::try_from(MAX_DOCX_AUTHORS).unwrap_or(i64::MAX);
            let authors = brandpulse_db::list_top_authors(pool, session_id, limit).await?;
            brandpulse_report::docx_export(&bundle, &authors)?
        }
        ExportFormat::Pdf => {
            anyhow::ensure!(
                brandpulse_report::pdf_exportable(&bundle),
                "session {session_id} has no completed analysis result"
            );
            let renderer = ChromiumRenderer::new(config.pdf.clone());
            brandpulse_report::pdf_export(&bundle, &renderer, &config.pdf.chart_js_url).await?
        }
        ExportFormat::Json => {
            serde_json::to_vec_pretty(&brandpulse_report::raw_export(&bundle))?
        }
    };

    let path = output_path(out, &bundle.session.title, format);
    write_export(&path, &bytes).await?;

    tracing::info!(
        session_id = %session_id,
        format = format.extension(),
        bytes = bytes.len(),
        "export written"
    );
    println!("wrote {} ({} bytes)", path.display(), bytes.len());
    Ok(())
}

async fn write_export(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .map_err(|e| anyhow::anyhow!("failed to write {}: {e}", path.display()))
}
