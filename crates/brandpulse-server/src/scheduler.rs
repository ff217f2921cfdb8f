//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! stale-run sweeper.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Every ten minutes, on the minute.
const STALE_SWEEP_SCHEDULE: &str = "0 */10 * * * *";

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<brandpulse_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_stale_sweep_job(&scheduler, pool, config.analysis_stale_secs).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register the sweeper that fails runs stuck in `running` after a crash.
///
/// Both the run and its session are marked `failed`, so a session never
/// stays `running` forever once its worker is gone.
async fn register_stale_sweep_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    stale_secs: u64,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);
    let older_than = i64::try_from(stale_secs).unwrap_or(i64::MAX);

    let job = Job::new_async(STALE_SWEEP_SCHEDULE, move |_uuid, _lock| {
        let pool = Arc::clone(&pool);

        Box::pin(async move {
            sweep_stale_runs(&pool, older_than).await;
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

async fn sweep_stale_runs(pool: &PgPool, older_than_secs: i64) {
    match brandpulse_db::fail_stale_analysis_runs(pool, older_than_secs).await {
        Ok(sessions) if sessions.is_empty() => {
            tracing::debug!("scheduler: no stale analysis runs");
        }
        Ok(sessions) => {
            for session_id in &sessions {
                tracing::warn!(
                    session_id = %session_id,
                    older_than_secs,
                    "scheduler: marked stale analysis run failed"
                );
            }
            tracing::info!(count = sessions.len(), "scheduler: stale-run sweep complete");
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: stale-run sweep failed");
        }
    }
}
