//! Configuration loading and resolution
//!
//! Each setting is resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Arguments and environment variables are both parsed by the binary (clap
//! with `env`) and arrive here as [`Overrides`].

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{info, warn};

/// Entity store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Volatile in-process store, lost on shutdown
    #[default]
    Memory,
    /// Durable SQLite database file
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "sqlite" => Ok(StorageBackend::Sqlite),
            other => Err(Error::Config(format!(
                "Unknown storage backend '{}' (expected 'memory' or 'sqlite')",
                other
            ))),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Memory => write!(f, "memory"),
            StorageBackend::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Compiled fallback values
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_path: PathBuf,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            storage: StorageBackend::Memory,
            database_path: default_database_path(),
            log_level: "info".to_string(),
        }
    }
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub storage: Option<StorageBackend>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub auth_secret: Option<String>,
}

impl TomlConfig {
    /// Parse TOML text
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load the config file, falling back to an empty config when it is absent
    ///
    /// Uses `explicit` when given, otherwise the platform config location.
    /// A missing file only logs a warning; a malformed one is an error.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit.map(Path::to_path_buf).or_else(default_config_path) {
            Some(path) => path,
            None => {
                warn!("Could not determine config directory, using defaults");
                return Ok(Self::default());
            }
        };

        if !path.exists() {
            warn!("Config file not found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let config = Self::parse(&content)?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub storage: Option<StorageBackend>,
    pub database_path: Option<PathBuf>,
    pub log_level: Option<String>,
    pub auth_secret: Option<String>,
}

/// Fully resolved server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub database_path: PathBuf,
    pub log_level: String,
    /// Secret shared with the gateway that signs caller identities; no default
    pub auth_secret: Option<String>,
}

impl ServerConfig {
    /// Merge overrides, file values and compiled defaults
    pub fn resolve(overrides: Overrides, file: TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        Self {
            host: overrides.host.or(file.host).unwrap_or(defaults.host),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            storage: overrides.storage.or(file.storage).unwrap_or(defaults.storage),
            database_path: overrides
                .database_path
                .or(file.database_path)
                .unwrap_or(defaults.database_path),
            log_level: overrides.log_level.or(file.log_level).unwrap_or(defaults.log_level),
            auth_secret: overrides
                .auth_secret
                .or(file.auth_secret)
                .filter(|secret| !secret.trim().is_empty()),
        }
    }

    /// Listener address; IPv6 literals are bracketed, host names pass through
    pub fn bind_addr(&self) -> String {
        match self.host.parse::<IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// The gateway secret; the server refuses to start without one
    pub fn require_auth_secret(&self) -> Result<&str> {
        self.auth_secret.as_deref().ok_or_else(|| {
            Error::Config(
                "No auth secret configured (set auth_secret, OPENMUSIC_AUTH_SECRET or --auth-secret)"
                    .to_string(),
            )
        })
    }
}

/// Platform config file location (`~/.config/openmusic/config.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("openmusic").join("config.toml"))
}

/// Platform data location for the SQLite database
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("openmusic").join("openmusic.db"))
        .unwrap_or_else(|| PathBuf::from("./openmusic_data/openmusic.db"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_backend_from_str() {
        assert_eq!("memory".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
        assert_eq!(" SQLite ".parse::<StorageBackend>().unwrap(), StorageBackend::Sqlite);
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn test_toml_parse_partial() {
        let config = TomlConfig::parse("port = 8080\nstorage = \"sqlite\"\n").unwrap();
        assert_eq!(config.port, Some(8080));
        assert_eq!(config.storage, Some(StorageBackend::Sqlite));
        assert!(config.host.is_none());
    }

    #[test]
    fn test_toml_parse_rejects_bad_backend() {
        let result = TomlConfig::parse("storage = \"redis\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_resolve_priority() {
        let file = TomlConfig {
            host: Some("0.0.0.0".to_string()),
            port: Some(9000),
            ..Default::default()
        };
        let overrides = Overrides {
            port: Some(7000),
            ..Default::default()
        };

        let config = ServerConfig::resolve(overrides, file);

        // Override beats file, file beats default
        assert_eq!(config.port, 7000);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.bind_addr(), "0.0.0.0:7000");
    }

    #[test]
    fn test_bind_addr_brackets_ipv6() {
        let mut config = ServerConfig::resolve(Overrides::default(), TomlConfig::default());

        config.host = "::1".to_string();
        assert_eq!(config.bind_addr(), "[::1]:5000");
        assert!(config.bind_addr().parse::<SocketAddr>().is_ok());

        config.host = "localhost".to_string();
        assert_eq!(config.bind_addr(), "localhost:5000");
    }

    #[test]
    fn test_auth_secret_required() {
        let config = ServerConfig::resolve(Overrides::default(), TomlConfig::default());
        assert!(matches!(config.require_auth_secret(), Err(Error::Config(_))));

        let blank = TomlConfig::parse("auth_secret = \"  \"\n").unwrap();
        let config = ServerConfig::resolve(Overrides::default(), blank);
        assert!(config.require_auth_secret().is_err());

        let file = TomlConfig::parse("auth_secret = \"from-file\"\n").unwrap();
        let overrides = Overrides {
            auth_secret: Some("from-env".to_string()),
            ..Default::default()
        };
        let config = ServerConfig::resolve(overrides, file);
        assert_eq!(config.require_auth_secret().unwrap(), "from-env");
    }
}
