//! Shared domain types, configuration, and presentation helpers for brandpulse.

pub mod app_config;
pub mod config;
pub mod format;
pub mod palette;
pub mod sessions;

use thiserror::Error;

pub use app_config::{AppConfig, Environment, PdfConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use format::{format_number, format_percent, SentimentBreakdown};
pub use palette::BrandPalette;
pub use sessions::{
    BrandInput, BrandRole, FieldViolation, NewSession, Platform, SessionStatus,
    MAX_COMPETITORS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid session status: {0}")]
    InvalidStatus(String),

    #[error("invalid brand role: {0}")]
    InvalidRole(String),
}
