//! Configuration file loading with precedence handling.

use crate::list::{ListTuning, TuningError};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Model used when neither the CLI, the environment nor the config file names one.
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

/// Messages API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Default response token budget.
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (file may not exist or have permission issues).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML syntax or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },

    /// The `[list]` table would break estimation or layout.
    #[error("Invalid [list] tuning: {0}")]
    InvalidTuning(#[from] TuningError),
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/chatlist/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Model identifier sent with every request.
    #[serde(default)]
    pub model: Option<String>,

    /// API key. Prefer the environment for secrets.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Messages endpoint override (proxies, gateways).
    #[serde(default)]
    pub api_url: Option<String>,

    /// Response token budget.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    #[serde(default)]
    pub temperature: Option<f64>,

    /// System prompt sent with every request.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Note file holding the conversation history.
    #[serde(default)]
    pub history_file: Option<PathBuf>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,

    /// Message list tuning.
    #[serde(default)]
    pub list: Option<ListTuningSection>,
}

/// `[list]` table of estimator and measurement tuning.
///
/// ```toml
/// [list]
/// chars_per_line = 72
/// code_block_bonus = 3
/// debounce_ms = 150
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ListTuningSection {
    /// Header plus padding of a row.
    #[serde(default)]
    pub base_height: Option<u32>,
    /// Height of one wrapped line.
    #[serde(default)]
    pub line_height: Option<u32>,
    /// Characters assumed per line before the binding reports a width.
    #[serde(default)]
    pub chars_per_line: Option<u32>,
    /// Extra height for fenced code.
    #[serde(default)]
    pub code_block_bonus: Option<u32>,
    /// Estimate floor.
    #[serde(default)]
    pub min_height: Option<u32>,
    /// Measurement deltas ignored as jitter.
    #[serde(default)]
    pub jitter_threshold: Option<u32>,
    /// Resize debounce window in milliseconds.
    #[serde(default)]
    pub debounce_ms: Option<u64>,
    /// Distance from the bottom still treated as pinned.
    #[serde(default)]
    pub bottom_threshold: Option<u32>,
    /// Rows mounted beyond each viewport edge.
    #[serde(default)]
    pub overscan: Option<usize>,
}

impl ListTuningSection {
    /// Overlay the table on a base profile.
    pub fn apply(&self, base: ListTuning) -> ListTuning {
        ListTuning {
            base_height: self.base_height.unwrap_or(base.base_height),
            line_height: self.line_height.unwrap_or(base.line_height),
            chars_per_line: self.chars_per_line.unwrap_or(base.chars_per_line),
            code_block_bonus: self.code_block_bonus.unwrap_or(base.code_block_bonus),
            min_height: self.min_height.unwrap_or(base.min_height),
            jitter_threshold: self.jitter_threshold.unwrap_or(base.jitter_threshold),
            debounce: self
                .debounce_ms
                .map(Duration::from_millis)
                .unwrap_or(base.debounce),
            bottom_threshold: self.bottom_threshold.unwrap_or(base.bottom_threshold),
            overscan: self.overscan.unwrap_or(base.overscan),
        }
    }
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Model identifier.
    pub model: String,
    /// API key, if any source provided one.
    pub api_key: Option<String>,
    /// Messages endpoint.
    pub api_url: String,
    /// Response token budget.
    pub max_tokens: u32,
    /// Sampling temperature (`None` uses the API default).
    pub temperature: Option<f64>,
    /// System prompt.
    pub system_prompt: Option<String>,
    /// Note file holding the conversation history.
    pub history_file: PathBuf,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
    /// Message list tuning, terminal profile unless overridden.
    pub tuning: ListTuning,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            system_prompt: None,
            history_file: default_history_path(),
            log_file_path: default_log_path(),
            tuning: ListTuning::terminal(),
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/chatlist/chatlist.log` on Unix-like systems,
/// or appropriate platform path on other systems.
///
/// If state directory cannot be determined, falls back to current directory.
pub fn default_log_path() -> PathBuf {
    if let Some(state_dir) = dirs::state_dir() {
        state_dir.join("chatlist").join("chatlist.log")
    } else {
        PathBuf::from("chatlist.log")
    }
}

/// Resolve default history note file.
///
/// Returns `~/.local/share/chatlist/history.jsonl`, falling back to the
/// current directory.
pub fn default_history_path() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join("chatlist").join("history.jsonl")
    } else {
        PathBuf::from("chatlist-history.jsonl")
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

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
/// Returns `~/.config/chatlist/config.toml` on Unix, appropriate path on other platforms.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatlist").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `CHATLIST_CONFIG` environment variable
/// 3. Default path `~/.config/chatlist/config.toml`
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

    if let Ok(env_path) = std::env::var("CHATLIST_CONFIG") {
        return load_config_file(PathBuf::from(env_path));
    }

    if let Some(default_path) = default_config_path() {
        return load_config_file(default_path);
    }

    Ok(None)
}

/// Merge config file into defaults to create resolved config.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidTuning`] if the `[list]` table fails validation.
pub fn merge_config(config_file: Option<ConfigFile>) -> Result<ResolvedConfig, ConfigError> {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return Ok(defaults);
    };

    let tuning = match &config.list {
        Some(section) => section.apply(defaults.tuning),
        None => defaults.tuning,
    };
    tuning.validate()?;

    Ok(ResolvedConfig {
        model: config.model.unwrap_or(defaults.model),
        api_key: config.api_key.or(defaults.api_key),
        api_url: config.api_url.unwrap_or(defaults.api_url),
        max_tokens: config.max_tokens.unwrap_or(defaults.max_tokens),
        temperature: config.temperature.or(defaults.temperature),
        system_prompt: config.system_prompt.or(defaults.system_prompt),
        history_file: config.history_file.unwrap_or(defaults.history_file),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
        tuning,
    })
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `CHATLIST_MODEL`: Override model
/// - `CHATLIST_API_KEY`, then `ANTHROPIC_API_KEY`: Override API key
///
/// Empty values are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(model) = non_empty_env("CHATLIST_MODEL") {
        config.model = model;
    }

    let key = non_empty_env("CHATLIST_API_KEY").or_else(|| non_empty_env("ANTHROPIC_API_KEY"));
    if let Some(key) = key {
        config.api_key = Some(key);
    }

    config
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.trim().is_empty())
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// Only applies overrides for flags that were explicitly set by the user.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    model_override: Option<String>,
    history_override: Option<PathBuf>,
) -> ResolvedConfig {
    if let Some(model) = model_override {
        config.model = model;
    }

    if let Some(history) = history_override {
        config.history_file = history;
    }

    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;
