use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Source of a configuration value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    Default,
    File,
    Environment,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::File => write!(f, "file"),
            ConfigSource::Environment => write!(f, "environment"),
        }
    }
}

/// A configuration value with its source
#[derive(Debug, Clone, Serialize)]
pub struct ConfigValue<T> {
    pub value: T,
    pub source: ConfigSource,
}

impl<T> ConfigValue<T> {
    pub fn new(value: T, source: ConfigSource) -> Self {
        Self { value, source }
    }
}

fn default_interval_secs() -> u64 {
    60
}

fn default_pull_limit() -> u32 {
    50
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Remote store and background sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the remote store, e.g. "https://xyz.supabase.co"
    pub remote_url: Option<String>,
    /// Project API key sent as the `apikey` header
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Seconds between background sync cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Rows fetched per table when pulling
    #[serde(default = "default_pull_limit")]
    pub pull_limit: u32,
    /// Seconds before a single remote request is abandoned
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Run a sync cycle after every write command (default: false)
    #[serde(default)]
    pub auto_sync: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            api_key: None,
            interval_secs: default_interval_secs(),
            pull_limit: default_pull_limit(),
            request_timeout_secs: default_request_timeout_secs(),
            auto_sync: false,
        }
    }
}

impl SyncConfig {
    /// Returns true if the remote store is configured (has both remote_url and api_key)
    pub fn is_configured(&self) -> bool {
        self.remote_url.is_some() && self.api_key.is_some()
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Application configuration with source tracking
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Path to the SQLite database
    pub database_path: ConfigValue<PathBuf>,
    /// Path to the persisted sign-in session
    pub session_path: ConfigValue<PathBuf>,
    /// Config file path used (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<PathBuf>,
    /// Sync configuration
    pub sync: SyncConfig,
}

/// Internal struct for deserializing config file
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    session_path: Option<PathBuf>,
    sync: Option<SyncConfig>,
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let data_dir = Self::default_data_dir();

        // Start with defaults
        let mut database_path =
            ConfigValue::new(data_dir.join("fitsync.db"), ConfigSource::Default);
        let mut session_path =
            ConfigValue::new(data_dir.join("session.yaml"), ConfigSource::Default);
        let mut config_file = None;
        let mut sync = SyncConfig::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::Read(path.clone(), e))?;
            let file_config: ConfigFile = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::Parse(path.clone(), e))?;

            if let Some(db_path) = file_config.database_path {
                database_path = ConfigValue::new(resolve(&path, db_path), ConfigSource::File);
            }
            if let Some(session) = file_config.session_path {
                session_path = ConfigValue::new(resolve(&path, session), ConfigSource::File);
            }
            if let Some(sync_config) = file_config.sync {
                sync = sync_config;
            }

            config_file = Some(path);
        }

        // Apply environment variable overrides
        if let Ok(db_path) = std::env::var("FITSYNC_DATABASE_PATH") {
            database_path = ConfigValue::new(PathBuf::from(db_path), ConfigSource::Environment);
        }
        if let Ok(session) = std::env::var("FITSYNC_SESSION_PATH") {
            session_path = ConfigValue::new(PathBuf::from(session), ConfigSource::Environment);
        }
        // Sync env var overrides
        if let Ok(url) = std::env::var("FITSYNC_REMOTE_URL") {
            sync.remote_url = Some(url);
        }
        if let Ok(key) = std::env::var("FITSYNC_API_KEY") {
            sync.api_key = Some(key);
        }
        if let Ok(secs) = std::env::var("FITSYNC_SYNC_INTERVAL") {
            sync.interval_secs = secs.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "FITSYNC_SYNC_INTERVAL",
                value: secs.clone(),
            })?;
        }
        if let Ok(secs) = std::env::var("FITSYNC_REQUEST_TIMEOUT") {
            sync.request_timeout_secs = secs.parse().map_err(|_| ConfigError::InvalidEnv {
                var: "FITSYNC_REQUEST_TIMEOUT",
                value: secs.clone(),
            })?;
        }

        Ok(Self {
            database_path,
            session_path,
            config_file,
            sync,
        })
    }

    /// Default config directory (platform-specific):
    /// - Linux: ~/.config/fitsync/
    /// - macOS: ~/Library/Application Support/fitsync/
    /// - Windows: %APPDATA%/fitsync/
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitsync")
    }

    /// Default data directory (platform-specific):
    /// - Linux: ~/.local/share/fitsync/
    /// - macOS: ~/Library/Application Support/fitsync/
    /// - Windows: %APPDATA%/fitsync/
    pub fn default_data_dir() -> PathBuf {
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fitsync")
    }

    /// Default config file path (platform-specific config dir + config.yaml)
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join("config.yaml")
    }
}

// Relative paths resolve against the config file's directory
fn resolve(config_path: &Path, value: PathBuf) -> PathBuf {
    if value.is_relative() {
        config_path
            .parent()
            .map(|p| p.join(&value))
            .unwrap_or(value)
    } else {
        value
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {1}", .0.display())]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file '{}': {1}", .0.display())]
    Parse(PathBuf, serde_yaml::Error),

    #[error("Invalid value '{value}' for {var}")]
    InvalidEnv { var: &'static str, value: String },
}
