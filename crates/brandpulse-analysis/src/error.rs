use brandpulse_db::DbError;
use thiserror::Error;
use uuid::Uuid;

/// Errors from triggering or running an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No analysis service endpoint is configured.
    #[error("analysis service is not configured (set BRANDPULSE_ANALYSIS_URL)")]
    NotConfigured,

    /// The configured endpoint is not a usable URL.
    #[error("invalid analysis service URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// Network or TLS failure talking to the analysis service.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The analysis service answered with a non-2xx status.
    #[error("analysis service returned {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("session {0} not found")]
    SessionNotFound(Uuid),

    /// A run is already queued or running for the session.
    #[error("analysis already in progress for session {0}")]
    AlreadyRunning(Uuid),

    #[error(transparent)]
    Db(DbError),
}

impl From<DbError> for AnalysisError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::RunInFlight { session_id } => Self::AlreadyRunning(session_id),
            other => Self::Db(other),
        }
    }
}
