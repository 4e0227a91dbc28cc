//! Command-line arguments
//!
//! Every flag also reads an environment variable, so clap resolves the
//! first two configuration tiers before the TOML file is consulted.

use clap::Parser;
use openmusic_common::config::{Overrides, StorageBackend};
use std::path::PathBuf;

/// Command-line arguments for openmusic-api
#[derive(Parser, Debug)]
#[command(name = "openmusic-api")]
#[command(about = "Playlist and music catalog API server")]
#[command(version)]
pub struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "OPENMUSIC_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "OPENMUSIC_HOST")]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "OPENMUSIC_PORT")]
    pub port: Option<u16>,

    /// Entity store backend (memory or sqlite)
    #[arg(long, env = "OPENMUSIC_STORAGE")]
    pub storage: Option<StorageBackend>,

    /// SQLite database file (sqlite backend only)
    #[arg(long, env = "OPENMUSIC_DATABASE")]
    pub database: Option<PathBuf>,

    /// Log level for openmusic crates when RUST_LOG is unset
    #[arg(long, env = "OPENMUSIC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Secret shared with the gateway that signs caller identities
    #[arg(long, env = "OPENMUSIC_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: Option<String>,
}

impl Args {
    /// Settings given on the command line or through the environment
    pub fn overrides(&self) -> Overrides {
        Overrides {
            host: self.host.clone(),
            port: self.port,
            storage: self.storage,
            database_path: self.database.clone(),
            log_level: self.log_level.clone(),
            auth_secret: self.auth_secret.clone(),
        }
    }
}
