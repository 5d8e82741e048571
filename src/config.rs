//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides; the binary
//! applies command-line flags on top.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server and archive configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding the archive files
    #[serde(default = "default_rrd_path")]
    pub rrd_path: PathBuf,

    /// Sampling step in seconds
    #[serde(default = "default_step")]
    pub step_secs: u64,

    /// Search cache time to live in seconds
    #[serde(default = "default_search_cache")]
    pub search_cache_secs: u64,

    /// Optional CSV file with annotations
    #[serde(default)]
    pub annotation_file: Option<PathBuf>,

    /// Factor applied to every sampled value
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// rrdtool executable
    #[serde(default = "default_rrdtool_bin")]
    pub rrdtool_bin: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    9000
}

fn default_rrd_path() -> PathBuf {
    PathBuf::from("./sample/")
}

fn default_step() -> u64 {
    10
}

fn default_search_cache() -> u64 {
    600
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_rrdtool_bin() -> PathBuf {
    PathBuf::from("rrdtool")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rrd_path: default_rrd_path(),
            step_secs: default_step(),
            search_cache_secs: default_search_cache(),
            annotation_file: None,
            multiplier: default_multiplier(),
            rrdtool_bin: default_rrdtool_bin(),
        }
    }
}

impl ServerConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("rrdserver").join("config.toml")),
            Some(PathBuf::from("/etc/rrdserver/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        let mut config = Config::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Apply `RRDSERVER_*` overrides read through `var`
    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("RRDSERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("RRDSERVER_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        if let Some(path) = var("RRDSERVER_RRD_PATH") {
            self.server.rrd_path = PathBuf::from(path);
        }
        if let Some(step) = var("RRDSERVER_STEP").and_then(|s| s.parse().ok()) {
            self.server.step_secs = step;
        }
        if let Some(ttl) = var("RRDSERVER_SEARCH_CACHE").and_then(|s| s.parse().ok()) {
            self.server.search_cache_secs = ttl;
        }
        if let Some(file) = var("RRDSERVER_ANNOTATION_FILE") {
            self.server.annotation_file = Some(PathBuf::from(file));
        }
        if let Some(m) = var("RRDSERVER_MULTIPLIER").and_then(|s| s.parse().ok()) {
            self.server.multiplier = m;
        }
        if let Some(bin) = var("RRDSERVER_RRDTOOL") {
            self.server.rrdtool_bin = PathBuf::from(bin);
        }

        if let Some(level) = var("RRDSERVER_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("RRDSERVER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# rrdserver Configuration
#
# Environment variables override these settings:
# - RRDSERVER_HOST, RRDSERVER_PORT
# - RRDSERVER_RRD_PATH, RRDSERVER_STEP, RRDSERVER_SEARCH_CACHE
# - RRDSERVER_ANNOTATION_FILE, RRDSERVER_MULTIPLIER, RRDSERVER_RRDTOOL
# - RRDSERVER_LOG_LEVEL, RRDSERVER_LOG_FORMAT
#
# Command-line flags override both.

[server]
# Address to listen on (empty or 0.0.0.0 for any interface)
host = "0.0.0.0"
port = 9000

# Directory that holds the .rrd archives
rrd_path = "./sample/"

# Sampling step in seconds
step_secs = 10

# How long the search cache lives (seconds)
search_cache_secs = 600

# CSV file with annotations (time,title,tags,text)
# annotation_file = "./sample/annotations.csv"

# Factor applied to every value
multiplier = 1.0

# rrdtool executable
rrdtool_bin = "rrdtool"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
