//! Offline tests for brandpulse-db pool configuration and row helpers.
//! These tests do not require a live database connection.

use brandpulse_core::{AppConfig, Environment, PdfConfig, Platform};
use brandpulse_db::{hash_api_key, BrandRow, PoolConfig, SessionRow, TriggerSource};
use chrono::Utc;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let app_config = AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 3000),
        log_level: "info".to_string(),
        api_key_hash_salt: "salt".to_string(),
        internal_token: None,
        analysis_url: None,
        analysis_timeout_secs: 1800,
        analysis_stale_secs: 7200,
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        pdf: PdfConfig::default(),
    };

    let pool_config = PoolConfig::from_app_config(&app_config);
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn brand_row_exposes_handles_by_platform() {
    let row = BrandRow {
        id: 1,
        session_id: Uuid::new_v4(),
        role: "focus".to_string(),
        position: 0,
        name: "Acme".to_string(),
        website: None,
        instagram: Some("@acme".to_string()),
        tiktok: None,
        twitter: Some("@acme_hq".to_string()),
        youtube: None,
        facebook: None,
    };

    assert!(row.is_focus());
    assert_eq!(row.handle(Platform::Instagram), Some("@acme"));
    assert_eq!(row.handle(Platform::Twitter), Some("@acme_hq"));
    assert_eq!(row.handle(Platform::Tiktok), None);
}

#[test]
fn session_row_with_unknown_status_reads_as_pending() {
    let row = SessionRow {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        title: "t".to_string(),
        status: "archived".to_string(),
        universe_keywords: None,
        notification_read: false,
        created_at: Utc::now(),
        completed_at: None,
    };

    assert_eq!(row.parsed_status(), brandpulse_core::SessionStatus::Pending);
}

#[test]
fn trigger_sources_match_the_check_constraint() {
    let values: Vec<&str> = [
        TriggerSource::User,
        TriggerSource::Internal,
        TriggerSource::Create,
        TriggerSource::Cli,
    ]
    .into_iter()
    .map(TriggerSource::as_str)
    .collect();
    assert_eq!(values, vec!["user", "internal", "create", "cli"]);
}

#[test]
fn api_key_hash_depends_on_key() {
    assert_ne!(hash_api_key("s", "key-1"), hash_api_key("s", "key-2"));
}
