//! Analysis triggering for brandpulse sessions.
//!
//! The analysis itself runs in an external service behind the [`Analyzer`]
//! trait; this crate owns the run bookkeeping around it.

pub mod analyzer;
pub mod error;
pub mod trigger;

use std::sync::Arc;

use brandpulse_core::AppConfig;

pub use analyzer::{Analyzer, RemoteAnalyzer, StartNotice, UnconfiguredAnalyzer};
pub use error::AnalysisError;
pub use trigger::{AnalysisTrigger, RunOutcome};

/// Picks the analyzer for the configured environment.
///
/// # Errors
///
/// Returns [`AnalysisError::InvalidUrl`] or [`AnalysisError::Http`] if a
/// configured service URL cannot be used.
pub fn analyzer_from_config(config: &AppConfig) -> Result<Arc<dyn Analyzer>, AnalysisError> {
    match config.analysis_url.as_deref() {
        Some(url) => Ok(Arc::new(RemoteAnalyzer::new(url, config.analysis_timeout_secs)?)),
        None => {
            tracing::warn!("BRANDPULSE_ANALYSIS_URL is not set; every analysis run will fail");
            Ok(Arc::new(UnconfiguredAnalyzer))
        }
    }
}
