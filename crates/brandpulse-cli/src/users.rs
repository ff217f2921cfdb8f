//! User management command handlers.

use brandpulse_core::AppConfig;
use clap::Subcommand;
use rand::{distr::Alphanumeric, Rng};

const API_KEY_LEN: usize = 40;
const API_KEY_PREFIX: &str = "bp_";

/// Sub-commands available under `users`.
#[derive(Debug, Subcommand)]
pub enum UserCommands {
    /// Create a user and print their API key
    Create {
        /// Login email, unique per user
        #[arg(long)]
        email: String,
        /// Optional display name
        #[arg(long)]
        name: Option<String>,
    },
}

/// Dispatch a `users` sub-command.
///
/// # Errors
///
/// Returns an error if the database write fails.
pub(crate) async fn run_users(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: UserCommands,
) -> anyhow::Result<()> {
    match command {
        UserCommands::Create { email, name } => {
            run_users_create(pool, config, &email, name.as_deref()).await
        }
    }
}

/// Random key of the form `bp_<40 alphanumerics>`.
pub(crate) fn generate_api_key() -> String {
    let body: String = rand::rng()
        .sample_iter(Alphanumeric)
        .take(API_KEY_LEN)
        .map(char::from)
        .collect();
    format!("{API_KEY_PREFIX}{body}")
}

async fn run_users_create(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    email: &str,
    name: Option<&str>,
) -> anyhow::Result<()> {
    let email = email.trim();
    anyhow::ensure!(email.contains('@'), "'{email}' is not an email address");

    let api_key = generate_api_key();
    let hash = brandpulse_db::hash_api_key(&config.api_key_hash_salt, &api_key);
    let user = match brandpulse_db::create_user(pool, email, name, &hash).await {
        Ok(user) => user,
        Err(e) if e.is_unique_violation() => {
            anyhow::bail!("a user with email '{email}' already exists")
        }
        Err(e) => return Err(e.into()),
    };

    tracing::info!(user_id = %user.id, "user created");
    println!("created user {} ({})", user.id, user.email);
    println!("API key (shown once, store it now): {api_key}");
    Ok(())
}
