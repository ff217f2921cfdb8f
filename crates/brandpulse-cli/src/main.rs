mod analyze;
mod export;
mod users;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::{export::ExportFormat, users::UserCommands};

#[derive(Debug, Parser)]
#[command(name = "brandpulse-cli")]
#[command(about = "BrandPulse operator command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Manage API users
    Users {
        #[command(subcommand)]
        command: UserCommands,
    },
    /// Write a session export to disk
    Export {
        /// Session id to export
        #[arg(long)]
        session: Uuid,
        /// Output format
        #[arg(long, value_enum)]
        format: ExportFormat,
        /// Output path (defaults to `<title>_<date>.<ext>` in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Run an analysis for a session in the foreground
    Analyze {
        /// Session id to analyze
        #[arg(long)]
        session: Uuid,
    },
    /// Create a completed demo session with every report section populated
    SeedDemo {
        /// Email of the user who will own the session
        #[arg(long)]
        email: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("brandpulse-cli ready; run with --help for commands");
        return Ok(());
    };

    let config = brandpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = brandpulse_db::PoolConfig::from_app_config(&config);
    let pool = brandpulse_db::connect_pool(&config.database_url, pool_config).await?;

    match command {
        Commands::Migrate => {
            let applied = brandpulse_db::run_migrations(&pool).await?;
            println!("migrations up to date ({applied} applied)");
        }
        Commands::Users { command } => users::run_users(&pool, &config, command).await?,
        Commands::Export {
            session,
            format,
            out,
        } => export::run_export(&pool, &config, session, format, out).await?,
        Commands::Analyze { session } => analyze::run_analyze(&pool, &config, session).await?,
        Commands::SeedDemo { email } => run_seed_demo(&pool, &email).await?,
    }

    Ok(())
}

/// Seed a demo session for an existing user.
///
/// # Errors
///
/// Returns an error if no user has `email` or a write fails.
async fn run_seed_demo(pool: &sqlx::PgPool, email: &str) -> anyhow::Result<()> {
    let user = brandpulse_db::find_user_by_email(pool, email)
        .await?
        .ok_or_else(|| anyhow::anyhow!("no user with email '{email}'; run `users create` first"))?;

    let session_id = brandpulse_db::seed::seed_demo_session(pool, user.id).await?;
    tracing::info!(session_id = %session_id, user_id = %user.id, "demo session seeded");
    println!("seeded demo session {session_id} for {email}");
    Ok(())
}
