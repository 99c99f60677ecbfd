use std::path::Path;

use serde::Deserialize;

/// Env var naming an optional YAML config file.
pub const CONFIG_ENV: &str = "COURIER_CONFIG";
/// Env var overriding `log_level`.
pub const LOG_ENV: &str = "COURIER_LOG";

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid port {0:?}: must be a number between 1 and 65535")]
    InvalidPort(String),
    #[error("invalid log level {0:?}")]
    InvalidLogLevel(String),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub server: ServerConfig,
    pub static_files: StaticConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    pub poll_interval_ms: u64,
    pub read_timeout_ms: u64,
    pub write_timeout_ms: u64,
    pub max_request_size: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StaticConfig {
    /// File served by `GET /image`
    pub image_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            server: ServerConfig::default(),
            static_files: StaticConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            backlog: 10,
            poll_interval_ms: 1000,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
            max_request_size: 64 * 1024,
        }
    }
}

impl Default for StaticConfig {
    fn default() -> Self {
        Self {
            image_path: "sample.png".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `COURIER_CONFIG`, then
    /// `COURIER_LOG`.
    pub fn load() -> Result<Self, ConfigError> {
        let mut cfg = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(level) = std::env::var(LOG_ENV) {
            cfg.log_level = level;
        }
        cfg.log_level()?;

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parsed `log_level`.
    pub fn log_level(&self) -> Result<tracing::Level, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::InvalidLogLevel(self.log_level.clone()))
    }
}

/// Parses the CLI port argument. Only decimal integers in 1..=65535 pass.
pub fn parse_port(arg: &str) -> Result<u16, ConfigError> {
    match arg.trim().parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(ConfigError::InvalidPort(arg.to_string())),
    }
}
