//! Command-line and environment resolution
//!
//! Tests that set OPENMUSIC_* variables run under `#[serial]`.

use clap::Parser;
use openmusic_api::cli::Args;
use openmusic_common::config::{ServerConfig, StorageBackend, TomlConfig};
use serial_test::serial;
use std::env;
use std::path::PathBuf;

const VARS: [&str; 7] = [
    "OPENMUSIC_CONFIG",
    "OPENMUSIC_HOST",
    "OPENMUSIC_PORT",
    "OPENMUSIC_STORAGE",
    "OPENMUSIC_DATABASE",
    "OPENMUSIC_LOG_LEVEL",
    "OPENMUSIC_AUTH_SECRET",
];

fn clear_env() {
    for var in VARS {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_flags_become_overrides() {
    clear_env();

    let args = Args::try_parse_from([
        "openmusic-api",
        "--port",
        "5100",
        "--storage",
        "sqlite",
        "--database",
        "/tmp/openmusic-test.db",
    ])
    .unwrap();
    let overrides = args.overrides();

    assert_eq!(overrides.port, Some(5100));
    assert_eq!(overrides.storage, Some(StorageBackend::Sqlite));
    assert_eq!(
        overrides.database_path,
        Some(PathBuf::from("/tmp/openmusic-test.db"))
    );
    assert_eq!(overrides.host, None);
}

#[test]
#[serial]
fn test_environment_fills_missing_flags() {
    clear_env();
    env::set_var("OPENMUSIC_HOST", "0.0.0.0");
    env::set_var("OPENMUSIC_PORT", "5200");

    let args = Args::try_parse_from(["openmusic-api", "--port", "5300"]).unwrap();
    clear_env();

    assert_eq!(args.host.as_deref(), Some("0.0.0.0"));
    // Flag beats environment
    assert_eq!(args.port, Some(5300));
}

#[test]
#[serial]
fn test_unknown_storage_is_rejected() {
    clear_env();
    assert!(Args::try_parse_from(["openmusic-api", "--storage", "postgres"]).is_err());
}

#[test]
#[serial]
fn test_overrides_beat_config_file() {
    clear_env();
    env::set_var("OPENMUSIC_STORAGE", "memory");

    let args = Args::try_parse_from(["openmusic-api"]).unwrap();
    clear_env();

    let file = TomlConfig::parse("storage = \"sqlite\"\nport = 6000\n").unwrap();
    let config = ServerConfig::resolve(args.overrides(), file);

    assert_eq!(config.storage, StorageBackend::Memory);
    assert_eq!(config.port, 6000);
    assert_eq!(config.host, "127.0.0.1");
}

#[test]
#[serial]
fn test_auth_secret_from_environment() {
    clear_env();
    env::set_var("OPENMUSIC_AUTH_SECRET", "shared-with-gateway");

    let args = Args::try_parse_from(["openmusic-api"]).unwrap();
    clear_env();

    let config = ServerConfig::resolve(args.overrides(), TomlConfig::default());
    assert_eq!(config.require_auth_secret().unwrap(), "shared-with-gateway");
}
