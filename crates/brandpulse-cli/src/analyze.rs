//! `analyze` command: runs one analysis to completion in the foreground.

use brandpulse_analysis::{AnalysisTrigger, RunOutcome};
use brandpulse_core::AppConfig;
use brandpulse_db::TriggerSource;
use uuid::Uuid;

/// Record a `cli` run and drive it to completion.
///
/// # Errors
///
/// Returns an error if the session does not exist, another run is in
/// flight, or the analysis fails. Failures are also persisted on the run.
pub(crate) async fn run_analyze(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    session_id: Uuid,
) -> anyhow::Result<()> {
    let analyzer = brandpulse_analysis::analyzer_from_config(config)?;
    let trigger = AnalysisTrigger::new(pool.clone(), analyzer);

    let run = trigger.enqueue(session_id, TriggerSource::Cli).await?;
    println!("analysis run {} started for session {session_id}", run.public_id);

    match trigger.execute(&run).await {
        RunOutcome::Succeeded => {
            println!("analysis run {} succeeded", run.public_id);
            Ok(())
        }
        RunOutcome::Failed(message) => {
            anyhow::bail!("analysis run {} failed: {message}", run.public_id)
        }
    }
}
