use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

pub const DEFAULT_CHART_JS_URL: &str =
    "https://cdn.jsdelivr.net/npm/chart.js@4.4.1/dist/chart.umd.min.js";

/// Settings for the headless-browser PDF export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfConfig {
    pub chrome_path: Option<PathBuf>,
    pub chart_js_url: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub load_timeout_secs: u64,
    pub ready_timeout_secs: u64,
    pub settle_ms: u64,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            chart_js_url: DEFAULT_CHART_JS_URL.to_string(),
            viewport_width: 1200,
            viewport_height: 1600,
            load_timeout_secs: 30,
            ready_timeout_secs: 10,
            settle_ms: 1500,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub api_key_hash_salt: String,
    pub internal_token: Option<String>,
    pub analysis_url: Option<String>,
    pub analysis_timeout_secs: u64,
    pub analysis_stale_secs: u64,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub pdf: PdfConfig,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("api_key_hash_salt", &"[redacted]")
            .field(
                "internal_token",
                &self.internal_token.as_ref().map(|_| "[redacted]"),
            )
            .field("analysis_url", &self.analysis_url)
            .field("analysis_timeout_secs", &self.analysis_timeout_secs)
            .field("analysis_stale_secs", &self.analysis_stale_secs)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("pdf", &self.pdf)
            .finish()
    }
}
