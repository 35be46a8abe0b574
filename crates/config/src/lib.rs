//! Configuration loading, validation, and management for Baton.
//!
//! Loads configuration from `~/.baton/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use baton_core::usage::Budget;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.baton/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Orchestrator behaviour
    #[serde(default)]
    pub agent: AgentConfig,

    /// Default per-run budget
    #[serde(default)]
    pub budget: BudgetConfig,

    /// Built-in tool settings
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Memory settings
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// System message sent ahead of the goal
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Wall-clock limit per tool call
    #[serde(default = "default_tool_timeout_ms")]
    pub tool_timeout_ms: u64,

    /// Ceiling on recorded tool output
    #[serde(default = "default_max_output_bytes")]
    pub max_output_bytes: usize,
}

fn default_system_prompt() -> String {
    "You are an orchestrator.".into()
}
fn default_tool_timeout_ms() -> u64 {
    10_000
}
fn default_max_output_bytes() -> usize {
    262_144
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            tool_timeout_ms: default_tool_timeout_ms(),
            max_output_bytes: default_max_output_bytes(),
        }
    }
}

/// Budget ceilings; an absent field leaves that dimension unbounded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cost_usd: Option<f64>,
}

impl BudgetConfig {
    /// `None` when neither ceiling is set.
    pub fn to_budget(&self) -> Option<Budget> {
        if self.max_tokens.is_none() && self.max_cost_usd.is_none() {
            return None;
        }
        Some(Budget {
            max_tokens: self.max_tokens,
            max_cost_usd: self.max_cost_usd,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_true")]
    pub shell_enabled: bool,

    /// Base commands the shell tool may run
    #[serde(default = "default_shell_allowlist")]
    pub shell_allowlist: Vec<String>,
}

fn default_true() -> bool {
    true
}
fn default_shell_allowlist() -> Vec<String> {
    baton_core::tool::SAFE_COMMANDS
        .iter()
        .map(|c| c.to_string())
        .collect()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shell_enabled: true,
            shell_allowlist: default_shell_allowlist(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,
}

fn default_search_limit() -> usize {
    baton_core::memory::DEFAULT_SEARCH_LIMIT
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            search_limit: default_search_limit(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.baton/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with_env(&Self::config_dir().join("config.toml"))
    }

    /// Load from `path`, then apply environment overrides and re-validate.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply `BATON_*` overrides read through `lookup`.
    pub fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(v) = lookup("BATON_TOOL_TIMEOUT_MS") {
            self.agent.tool_timeout_ms = parse_env("BATON_TOOL_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = lookup("BATON_MAX_OUTPUT_BYTES") {
            self.agent.max_output_bytes = parse_env("BATON_MAX_OUTPUT_BYTES", &v)?;
        }
        if let Some(v) = lookup("BATON_MAX_TOKENS") {
            self.budget.max_tokens = Some(parse_env("BATON_MAX_TOKENS", &v)?);
        }
        if let Some(v) = lookup("BATON_MAX_COST_USD") {
            self.budget.max_cost_usd = Some(parse_env("BATON_MAX_COST_USD", &v)?);
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".baton")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.tool_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "agent.tool_timeout_ms must be > 0".into(),
            ));
        }

        if self.agent.max_output_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_output_bytes must be > 0".into(),
            ));
        }

        if self.budget.max_cost_usd.is_some_and(|c| !(c >= 0.0)) {
            return Err(ConfigError::ValidationError(
                "budget.max_cost_usd must be >= 0".into(),
            ));
        }

        Ok(())
    }

    /// Render the default configuration as TOML.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn parse_env<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        var: var.to_string(),
        value: value.to_string(),
    })
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Invalid value for {var}: {value:?}")]
    InvalidEnv { var: String, value: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
