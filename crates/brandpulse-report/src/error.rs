use thiserror::Error;

/// Errors produced while rendering a report document.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The DOCX package could not be assembled.
    #[error("failed to build DOCX: {0}")]
    Docx(String),

    /// Chromium failed to launch, navigate, or print.
    #[error("browser error: {0}")]
    Browser(String),

    /// A bounded wait in the PDF pipeline ran out.
    #[error("timed out after {secs}s waiting for {stage}")]
    Timeout { stage: &'static str, secs: u64 },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<chromiumoxide::error::CdpError> for ReportError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        Self::Browser(err.to_string())
    }
}
