//! Configuration loading

use anyhow::{Context, Result, bail};
use dockerhub_client::client::{DEFAULT_AUTH_URL, DEFAULT_REGISTRY_URL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Settings document as written on disk
///
/// Every key is optional at this level so that empty YAML values fall back
/// to defaults the same way missing keys do.
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    config: Option<RawSettings>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSettings {
    #[serde(rename = "DOCKERHUB_EXPORTER_PORT")]
    port: Option<u16>,
    #[serde(rename = "DOCKERHUB_EXPORTER_VERBOSE")]
    verbose: Option<bool>,
    #[serde(rename = "DOCKERHUB_USERNAME")]
    username: Option<String>,
    #[serde(rename = "DOCKERHUB_PASSWORD")]
    password: Option<String>,
    #[serde(rename = "DOCKERHUB_EXPORTER_REPOSITORY")]
    repository: Option<String>,
    #[serde(rename = "DOCKERHUB_EXPORTER_POLL_INTERVAL")]
    poll_interval: Option<u64>,
    #[serde(rename = "DOCKERHUB_EXPORTER_TIMEOUT")]
    timeout: Option<u64>,
    #[serde(rename = "DOCKERHUB_EXPORTER_LOG_LEVEL")]
    log_level: Option<String>,
    #[serde(rename = "DOCKERHUB_AUTH_URL")]
    auth_url: Option<String>,
    #[serde(rename = "DOCKERHUB_REGISTRY_URL")]
    registry_url: Option<String>,
}

/// Resolved exporter configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub verbose: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    pub repository: String,
    /// Background poll period in seconds (0 disables the poll)
    pub poll_interval: u64,
    /// Outbound request timeout in seconds
    pub timeout: u64,
    pub log_level: String,
    pub auth_url: String,
    pub registry_url: String,
}

// Default value functions
fn default_port() -> u16 {
    8881
}

fn default_timeout() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &str) -> Result<Self> {
        let config_path = Path::new(path);

        if !config_path.exists() {
            bail!("Config file not found: {}", path);
        }

        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", path))?;

        info!("Loaded configuration from {}", path);
        Ok(config)
    }

    /// Parse and validate a settings document
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: ConfigFile =
            serde_yaml::from_str(content).context("Failed to parse YAML")?;

        let raw = file
            .config
            .context("Missing top-level `config` mapping")?;

        let repository = non_empty(raw.repository)
            .context("DOCKERHUB_EXPORTER_REPOSITORY must be set")?;

        let timeout = raw.timeout.unwrap_or_else(default_timeout);
        if timeout == 0 {
            bail!("DOCKERHUB_EXPORTER_TIMEOUT must be greater than 0");
        }

        Ok(Self {
            port: raw.port.filter(|p| *p != 0).unwrap_or_else(default_port),
            verbose: raw.verbose.unwrap_or(false),
            username: non_empty(raw.username),
            password: non_empty(raw.password),
            repository: repository.trim().to_string(),
            poll_interval: raw.poll_interval.unwrap_or(0),
            timeout,
            log_level: non_empty(raw.log_level).unwrap_or_else(default_log_level),
            auth_url: non_empty(raw.auth_url).unwrap_or_else(|| DEFAULT_AUTH_URL.to_string()),
            registry_url: non_empty(raw.registry_url)
                .unwrap_or_else(|| DEFAULT_REGISTRY_URL.to_string()),
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Background poll period, if enabled
    pub fn poll_interval(&self) -> Option<Duration> {
        (self.poll_interval > 0).then(|| Duration::from_secs(self.poll_interval))
    }
}
