use crate::app_config::{AppConfig, Environment, PdfConfig, DEFAULT_CHART_JS_URL};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Parsing and validation are decoupled from the real environment so tests can
/// drive this with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let database_url = require("DATABASE_URL")?;
    let api_key_hash_salt = require("BRANDPULSE_API_KEY_HASH_SALT")?;

    let env = parse_environment(&or_default("BRANDPULSE_ENV", "development"));
    let bind_addr = parse_addr("BRANDPULSE_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("BRANDPULSE_LOG_LEVEL", "info");

    let internal_token = optional("BRANDPULSE_INTERNAL_TOKEN");
    let analysis_url = optional("BRANDPULSE_ANALYSIS_URL");
    let analysis_timeout_secs = parse_u64("BRANDPULSE_ANALYSIS_TIMEOUT_SECS", "1800")?;
    let analysis_stale_secs = parse_u64("BRANDPULSE_ANALYSIS_STALE_SECS", "7200")?;

    let db_max_connections = parse_u32("BRANDPULSE_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("BRANDPULSE_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("BRANDPULSE_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let pdf = PdfConfig {
        chrome_path: optional("BRANDPULSE_CHROME_PATH").map(PathBuf::from),
        chart_js_url: or_default("BRANDPULSE_CHART_JS_URL", DEFAULT_CHART_JS_URL),
        viewport_width: parse_u32("BRANDPULSE_PDF_VIEWPORT_WIDTH", "1200")?,
        viewport_height: parse_u32("BRANDPULSE_PDF_VIEWPORT_HEIGHT", "1600")?,
        load_timeout_secs: parse_u64("BRANDPULSE_PDF_LOAD_TIMEOUT_SECS", "30")?,
        ready_timeout_secs: parse_u64("BRANDPULSE_PDF_READY_TIMEOUT_SECS", "10")?,
        settle_ms: parse_u64("BRANDPULSE_PDF_SETTLE_MS", "1500")?,
    };

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        api_key_hash_salt,
        internal_token,
        analysis_url,
        analysis_timeout_secs,
        analysis_stale_secs,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        pdf,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
