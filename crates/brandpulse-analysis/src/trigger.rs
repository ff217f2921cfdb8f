//! Starts analyses without blocking the caller.
//!
//! Each trigger records a `queued` row in `analysis_runs` first, so a second
//! trigger for the same session is rejected while one is in flight and the
//! outcome stays observable after the spawned task is gone. The session keeps
//! its `pending` status until the analyzer reports that work has begun.

use std::sync::Arc;

use brandpulse_core::SessionStatus;
use brandpulse_db::{
    complete_analysis_run, create_analysis_run, fail_analysis_run, get_session,
    set_session_status, start_analysis_run, AnalysisRunRow, TriggerSource,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    analyzer::{Analyzer, StartNotice},
    error::AnalysisError,
};

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Succeeded,
    Failed(String),
}

/// Creates runs and drives them to completion in the background.
#[derive(Clone)]
pub struct AnalysisTrigger {
    pool: PgPool,
    analyzer: Arc<dyn Analyzer>,
}

impl AnalysisTrigger {
    pub fn new(pool: PgPool, analyzer: Arc<dyn Analyzer>) -> Self {
        Self { pool, analyzer }
    }

    /// Records a queued run and detaches the analysis.
    ///
    /// The caller is responsible for authorizing access to the session.
    ///
    /// # Errors
    ///
    /// - [`AnalysisError::SessionNotFound`] if the session does not exist.
    /// - [`AnalysisError::AlreadyRunning`] if a run is already queued or running.
    /// - [`AnalysisError::Db`] if recording the run fails.
    pub async fn trigger(
        &self,
        session_id: Uuid,
        source: TriggerSource,
    ) -> Result<AnalysisRunRow, AnalysisError> {
        let run = self.enqueue(session_id, source).await?;

        let this = self.clone();
        let detached = run.clone();
        tokio::spawn(async move {
            this.execute(&detached).await;
        });

        Ok(run)
    }

    /// Records a queued run without starting it. Pair with [`Self::execute`]
    /// to run in the foreground.
    ///
    /// # Errors
    ///
    /// Same as [`Self::trigger`].
    pub async fn enqueue(
        &self,
        session_id: Uuid,
        source: TriggerSource,
    ) -> Result<AnalysisRunRow, AnalysisError> {
        if get_session(&self.pool, session_id).await?.is_none() {
            return Err(AnalysisError::SessionNotFound(session_id));
        }

        let run = create_analysis_run(&self.pool, session_id, source).await?;
        tracing::info!(
            session_id = %session_id,
            run_id = %run.public_id,
            trigger = %source,
            "analysis run queued"
        );
        Ok(run)
    }

    /// Drives a queued run to `succeeded` or `failed`, updating the session
    /// status alongside. Never returns an error: failures are logged and
    /// persisted on the run and session.
    ///
    /// The run and session only move to `running` once the analyzer signals
    /// through its [`StartNotice`] that work has begun.
    pub async fn execute(&self, run: &AnalysisRunRow) -> RunOutcome {
        let session_id = run.session_id;
        let (notice, mut started) = StartNotice::channel();
        let analysis = self.analyzer.analyze(session_id, notice);
        tokio::pin!(analysis);

        let mut running = false;
        let mut listening = true;
        let result = loop {
            tokio::select! {
                biased;
                signal = &mut started, if listening => {
                    listening = false;
                    if signal.is_ok() {
                        if let Err(e) = self.mark_running(run).await {
                            let message = format!("failed to start analysis: {e}");
                            self.record_failure(run, &message).await;
                            return RunOutcome::Failed(message);
                        }
                        running = true;
                    }
                }
                result = &mut analysis => break result,
            }
        };

        match result {
            Ok(()) => match self.mark_succeeded(run, running).await {
                Ok(()) => {
                    tracing::info!(session_id = %session_id, run_id = %run.public_id, "analysis completed");
                    RunOutcome::Succeeded
                }
                Err(e) => {
                    let message = format!("failed to record completion: {e}");
                    self.record_failure(run, &message).await;
                    RunOutcome::Failed(message)
                }
            },
            Err(e) => {
                let message = e.to_string();
                self.record_failure(run, &message).await;
                RunOutcome::Failed(message)
            }
        }
    }

    async fn mark_running(&self, run: &AnalysisRunRow) -> Result<(), AnalysisError> {
        start_analysis_run(&self.pool, run.id).await?;
        set_session_status(&self.pool, run.session_id, SessionStatus::Running).await?;
        tracing::info!(session_id = %run.session_id, run_id = %run.public_id, "analysis running");
        Ok(())
    }

    async fn mark_succeeded(&self, run: &AnalysisRunRow, running: bool) -> Result<(), AnalysisError> {
        // Analyzers that finish without signalling still pass through `running`.
        if !running {
            start_analysis_run(&self.pool, run.id).await?;
        }
        complete_analysis_run(&self.pool, run.id).await?;
        set_session_status(&self.pool, run.session_id, SessionStatus::Completed).await?;
        Ok(())
    }

    async fn record_failure(&self, run: &AnalysisRunRow, message: &str) {
        tracing::error!(
            session_id = %run.session_id,
            run_id = %run.public_id,
            error = %message,
            "analysis failed"
        );

        if let Err(e) = fail_analysis_run(&self.pool, run.id, message).await {
            tracing::error!(run_id = %run.public_id, error = %e, "failed to mark analysis run failed");
        }
        if let Err(e) = set_session_status(&self.pool, run.session_id, SessionStatus::Failed).await {
            tracing::error!(session_id = %run.session_id, error = %e, "failed to mark session failed");
        }
    }
}
