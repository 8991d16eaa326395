//! Configuration module for imgstation.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::{Result, StationError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins. Empty means any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/imgstation.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Upload storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Root directory holding the upload batches.
    #[serde(default = "default_storage_root")]
    pub root: String,
    /// Maximum request body size for uploads in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
}

fn default_storage_root() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    32
}

impl StorageConfig {
    /// Maximum upload body size in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: default_storage_root(),
            max_upload_size_mb: default_max_upload_size(),
        }
    }
}

/// Retention sweeper configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Whether the sweeper runs at all.
    #[serde(default = "default_retention_enabled")]
    pub enabled: bool,
    /// Maximum age of an individual file in seconds.
    #[serde(default = "default_file_ttl")]
    pub file_ttl_secs: u64,
    /// Maximum age of a whole batch directory in seconds.
    #[serde(default = "default_directory_ttl")]
    pub directory_ttl_secs: u64,
    /// Time between sweep cycles in seconds.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,
    /// Directories accessed within this many seconds are skipped by a cycle.
    #[serde(default = "default_busy_grace")]
    pub busy_grace_secs: u64,
}

fn default_retention_enabled() -> bool {
    true
}

fn default_file_ttl() -> u64 {
    4 * 3600 // 4 hours
}

fn default_directory_ttl() -> u64 {
    72 * 3600 // 72 hours
}

fn default_sweep_interval() -> u64 {
    3600 // 1 hour
}

fn default_busy_grace() -> u64 {
    600 // 10 minutes
}

impl RetentionConfig {
    /// File TTL as a Duration.
    pub fn file_ttl(&self) -> Duration {
        Duration::from_secs(self.file_ttl_secs)
    }

    /// Directory TTL as a Duration.
    pub fn directory_ttl(&self) -> Duration {
        Duration::from_secs(self.directory_ttl_secs)
    }

    /// Sweep interval as a Duration.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Busy grace window as a Duration.
    pub fn busy_grace(&self) -> Duration {
        Duration::from_secs(self.busy_grace_secs)
    }
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: default_retention_enabled(),
            file_ttl_secs: default_file_ttl(),
            directory_ttl_secs: default_directory_ttl(),
            sweep_interval_secs: default_sweep_interval(),
            busy_grace_secs: default_busy_grace(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/imgstation.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT secret key (required).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_token_expiry")]
    pub token_expiry_secs: u64,
    /// Username of the super admin created when none exists.
    #[serde(default)]
    pub admin_username: String,
    /// Password of the bootstrap super admin.
    #[serde(default)]
    pub admin_password: String,
}

fn default_token_expiry() -> u64 {
    24 * 3600 // 24 hours
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_expiry_secs: default_token_expiry(),
            admin_username: String::new(),
            admin_password: String::new(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Upload storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Retention sweeper configuration.
    #[serde(default)]
    pub retention: RetentionConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(StationError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration with environment overrides, falling back to the
    /// defaults only when the file does not exist.
    ///
    /// A file that exists but cannot be read or parsed is an error, so a
    /// typo never silently restores the default retention limits.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match Self::load_with_env(path) {
            Err(StationError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                let mut config = Self::default();
                config.apply_env_overrides();
                Ok(config)
            }
            result => result,
        }
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| StationError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `IMGSTATION_JWT_SECRET`: Override the JWT secret key
    /// - `IMGSTATION_STORAGE_ROOT`: Override the upload storage root
    /// - `IMGSTATION_ADMIN_PASSWORD`: Override the bootstrap admin password
    pub fn apply_env_overrides(&mut self) {
        if let Some(secret) = non_empty_env("IMGSTATION_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Some(root) = non_empty_env("IMGSTATION_STORAGE_ROOT") {
            self.storage.root = root;
        }
        if let Some(password) = non_empty_env("IMGSTATION_ADMIN_PASSWORD") {
            self.auth.admin_password = password;
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if:
    /// - the JWT secret is not set
    /// - any retention duration is zero
    /// - only one of admin username/password is set
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(StationError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via IMGSTATION_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }

        let retention = &self.retention;
        if retention.file_ttl_secs == 0
            || retention.directory_ttl_secs == 0
            || retention.sweep_interval_secs == 0
        {
            return Err(StationError::Config(
                "retention file_ttl_secs, directory_ttl_secs and sweep_interval_secs must be positive"
                    .to_string(),
            ));
        }

        if self.auth.admin_username.is_empty() != self.auth.admin_password.is_empty() {
            return Err(StationError::Config(
                "admin_username and admin_password must be set together".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
