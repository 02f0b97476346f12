//! Configuration file loading with precedence handling.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "SHIELDNET_CONFIG";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV_VAR: &str = "SHIELDNET_API_URL";

/// Base URL of a locally running backend.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Config file path contains invalid UTF-8 or cannot be resolved.
    #[error("Invalid config path: {0}")]
    InvalidPath(String),

    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/shieldnet/config.toml`.
///
/// ```toml
/// api_base_url = "https://shieldnet.example.com"
/// idle_timeout_secs = 90
/// report_blocked = false
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URL of the analysis backend.
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Seconds without a chunk before a streaming session gives up. 0 disables.
    #[serde(default)]
    pub idle_timeout_secs: Option<u64>,

    /// Seconds allowed for establishing a connection.
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,

    /// Report blocked verdicts to the threat network automatically.
    #[serde(default)]
    pub report_blocked: Option<bool>,

    /// Echo the model's streamed reasoning while analyzing.
    #[serde(default)]
    pub show_thinking: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// Base URL of the analysis backend, without trailing slash.
    pub api_base_url: String,
    /// Idle threshold in seconds; 0 means wait forever.
    pub idle_timeout_secs: u64,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Auto-report blocked verdicts.
    pub report_blocked: bool,
    /// Echo streamed reasoning.
    pub show_thinking: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            idle_timeout_secs: 120,
            connect_timeout_secs: 10,
            report_blocked: true,
            show_thinking: true,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Idle timeout for streaming sessions, `None` when disabled.
    pub fn idle_timeout(&self) -> Option<Duration> {
        (self.idle_timeout_secs > 0).then(|| Duration::from_secs(self.idle_timeout_secs))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/shieldnet/shieldnet.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("shieldnet").join("shieldnet.log")
    } else {
        PathBuf::from("shieldnet.log")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
/// Returns `Err` if file exists but cannot be read or parsed.
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    // Missing file is not an error - use defaults
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/shieldnet/config.toml` on Unix, appropriate path on other platforms.
/// Returns `None` if home directory cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("shieldnet").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `SHIELDNET_CONFIG` environment variable
/// 3. Default path `~/.config/shieldnet/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
        if env_path.is_empty() {
            return Err(ConfigError::InvalidPath(format!(
                "{} is set but empty",
                CONFIG_ENV_VAR
            )));
        }
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `SHIELDNET_API_URL`: Override the backend base URL
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Ok(url) = std::env::var(API_URL_ENV_VAR) {
        if !url.is_empty() {
            config.api_base_url = normalize_base_url(&url);
        }
    }

    config
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        api_base_url: config
            .api_base_url
            .as_deref()
            .map(normalize_base_url)
            .unwrap_or(defaults.api_base_url),
        idle_timeout_secs: config
            .idle_timeout_secs
            .unwrap_or(defaults.idle_timeout_secs),
        connect_timeout_secs: config
            .connect_timeout_secs
            .unwrap_or(defaults.connect_timeout_secs),
        report_blocked: config.report_blocked.unwrap_or(defaults.report_blocked),
        show_thinking: config.show_thinking.unwrap_or(defaults.show_thinking),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
///
/// # Arguments
///
/// * `config` - Base resolved config (already merged with defaults, file, and env vars)
/// * `api_url_override` - Optional base URL from `--api-url`
/// * `idle_timeout_override` - Optional idle threshold from `--idle-timeout`
/// * `report_override` - `Some(false)` from `--no-report`
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    api_url_override: Option<String>,
    idle_timeout_override: Option<u64>,
    report_override: Option<bool>,
) -> ResolvedConfig {
    if let Some(url) = api_url_override {
        config.api_base_url = normalize_base_url(&url);
    }

    if let Some(seconds) = idle_timeout_override {
        config.idle_timeout_secs = seconds;
    }

    if let Some(report) = report_override {
        config.report_blocked = report;
    }

    config
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
