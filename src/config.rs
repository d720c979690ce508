//! Configuration loading.
//!
//! Precedence: environment overrides > TOML file > defaults. The file is
//! optional; every field has a default. Model identifier and sampling
//! parameters are fixed in [`crate::client`] and cannot be configured here.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;

use crate::providers::groq::GROQ_API_BASE;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LEADREPLY_CONFIG";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Web form settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Completion provider settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Log filter and output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Web form settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Socket address the form is served on.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Seconds a browser session may sit idle before it is discarded.
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,

    /// Maximum number of browser sessions held in memory.
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            session_ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// OpenAI-compatible API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key_env: default_api_key_env(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Directory for rotated JSON logs written by `serve`. Defaults to
    /// `logs/` under the config directory.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

// Default value functions for serde

fn default_bind() -> String {
    "127.0.0.1:8501".to_owned()
}
fn default_session_ttl_secs() -> u64 {
    3600
}
fn default_max_sessions() -> usize {
    10_000
}
fn default_base_url() -> String {
    GROQ_API_BASE.to_owned()
}
fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_owned()
}
fn default_log_level() -> String {
    "info".to_owned()
}

impl Config {
    /// Load configuration from the resolved path plus environment overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or parsed.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path_with(|key| std::env::var(key).ok())?;
        let mut config = load_config(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// Takes a resolver function so tests avoid mutating the process
    /// environment.
    pub fn apply_overrides(&mut self, env: impl Fn(&str) -> Option<String>) {
        if let Some(v) = env("LEADREPLY_BIND") {
            self.server.bind = v;
        }
        if let Some(v) = env("LEADREPLY_API_BASE") {
            self.provider.base_url = v;
        }
        if let Some(v) = env("LEADREPLY_LOG_DIR") {
            self.logging.dir = Some(PathBuf::from(v));
        }
    }

    /// Directory for rotated log files.
    ///
    /// # Errors
    ///
    /// Returns an error if no directory is configured and the home directory
    /// cannot be determined.
    pub fn logs_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.logging.dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("logs")),
        }
    }
}

/// Load configuration from a TOML file, falling back to defaults when the
/// file does not exist.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            tracing::debug!(path = %path.display(), "loading config from file");
            toml::from_str(&contents)
                .with_context(|| format!("failed to parse config at {}", path.display()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => Err(anyhow::anyhow!(
            "failed to read config at {}: {e}",
            path.display()
        )),
    }
}

/// Resolve the config file path using a custom env resolver.
///
/// `$LEADREPLY_CONFIG` wins; otherwise `~/.leadreply/config.toml`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> anyhow::Result<PathBuf> {
    if let Some(p) = env(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(p));
    }
    Ok(config_dir()?.join("config.toml"))
}

/// Resolve the default config directory (`~/.leadreply/`).
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn config_dir() -> anyhow::Result<PathBuf> {
    let home = directories::BaseDirs::new()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
    Ok(home.home_dir().join(".leadreply"))
}
