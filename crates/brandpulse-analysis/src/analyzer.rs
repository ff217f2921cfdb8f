//! The seam to the external analysis routine.
//!
//! Scraping, aggregation and insight generation happen in a separate service;
//! this crate only asks it to process a session and waits for the answer.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tokio::sync::oneshot;
use url::Url;
use uuid::Uuid;

use crate::error::AnalysisError;

/// Longest response body kept in a rejection error.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Passed to [`Analyzer::analyze`]. Signalling it moves the run and the
/// session from their waiting states to `running`.
#[derive(Debug)]
pub struct StartNotice(Option<oneshot::Sender<()>>);

impl StartNotice {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (Self(Some(tx)), rx)
    }

    /// A notice nobody listens to, for calling an analyzer directly.
    #[must_use]
    pub fn detached() -> Self {
        Self(None)
    }

    /// Reports that the work has actually begun.
    pub fn notify(mut self) {
        if let Some(tx) = self.0.take() {
            // The trigger may have stopped listening; nothing to do then.
            let _ = tx.send(());
        }
    }
}

/// Runs the full analysis for one session. Implementations write their
/// results to the store themselves; returning `Ok` means they are in place.
///
/// Call [`StartNotice::notify`] once the work is really under way. Until
/// then the session keeps its `pending` status.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, session_id: Uuid, started: StartNotice) -> Result<(), AnalysisError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    session_id: Uuid,
}

/// Calls the analysis service over HTTP: `POST <url>` with `{"sessionId": ...}`.
pub struct RemoteAnalyzer {
    client: Client,
    endpoint: Url,
}

impl RemoteAnalyzer {
    /// # Errors
    ///
    /// Returns [`AnalysisError::InvalidUrl`] if `endpoint` is not an http(s)
    /// URL, or [`AnalysisError::Http`] if the client cannot be built.
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let url = Url::parse(endpoint).map_err(|e| AnalysisError::InvalidUrl {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AnalysisError::InvalidUrl {
                url: endpoint.to_string(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("brandpulse/0.1 (analysis-trigger)")
            .build()?;

        Ok(Self {
            client,
            endpoint: url,
        })
    }
}

#[async_trait]
impl Analyzer for RemoteAnalyzer {
    async fn analyze(&self, session_id: Uuid, started: StartNotice) -> Result<(), AnalysisError> {
        let request = self
            .client
            .post(self.endpoint.clone())
            .json(&AnalyzeRequest { session_id });
        started.notify();
        let response = request.send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AnalysisError::Rejected {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        })
    }
}

/// Stand-in used when no analysis service is configured. Every run fails
/// with [`AnalysisError::NotConfigured`].
pub struct UnconfiguredAnalyzer;

#[async_trait]
impl Analyzer for UnconfiguredAnalyzer {
    async fn analyze(&self, _session_id: Uuid, _started: StartNotice) -> Result<(), AnalysisError> {
        Err(AnalysisError::NotConfigured)
    }
}
