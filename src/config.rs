//! Configuration loading for skill-activator
//!
//! Supports TOML configuration with embedded defaults. This only controls
//! where files live and how the analyzer runs; rules come from the rule file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::ConfigurationError;

/// Default rule file, relative to the project directory
pub const DEFAULT_RULES_PATH: &str = ".claude/skills/skill-rules.json";

/// General configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Path to the rule-set document
    pub rules_path: String,

    /// Enable audit logging
    pub audit_log: bool,

    /// Path to audit log file
    pub audit_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            rules_path: DEFAULT_RULES_PATH.to_string(),
            audit_log: false,
            audit_path: Some("~/.claude/skill-activator/audit.jsonl".to_string()),
        }
    }
}

/// Content analyzer configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Run structural checks on post-edit content
    pub enabled: bool,

    /// Check names to skip
    pub disabled_checks: Vec<String>,

    /// Functions above this cyclomatic complexity raise `high-complexity`
    pub complexity_threshold: u32,

    /// Larger content is not analyzed
    pub max_content_bytes: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            disabled_checks: Vec::new(),
            complexity_threshold: 10,
            max_content_bytes: 1024 * 1024,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub analyzer: AnalyzerConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load() -> Self {
        // Try to load from standard locations
        let config_paths = [
            // User-specific config
            dirs::home_dir().map(|p| p.join(".claude/skill-activator/config.toml")),
            // System-wide config
            Some(PathBuf::from("/etc/skill-activator/config.toml")),
        ];

        for path in config_paths.into_iter().flatten() {
            if path.exists() {
                match Self::load_from(&path) {
                    Ok(config) => return config,
                    Err(e) => warn!(path = %path.display(), error = %e, "ignoring config file"),
                }
            }
        }

        // Return defaults
        Config::default()
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Expand ~ in path strings
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// Resolve the rule file against the project directory (when relative)
    pub fn rules_path(&self, project_dir: Option<&Path>) -> PathBuf {
        let path = Self::expand_path(&self.general.rules_path);
        match project_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        }
    }

    /// Get the audit log path (expanded)
    pub fn audit_path(&self) -> Option<PathBuf> {
        self.general.audit_path.as_deref().map(Self::expand_path)
    }
}

/// Embedded default configuration
pub const DEFAULT_CONFIG_TOML: &str = r#"
[general]
rules_path = ".claude/skills/skill-rules.json"
audit_log = false
audit_path = "~/.claude/skill-activator/audit.jsonl"

[analyzer]
enabled = true
disabled_checks = []
complexity_threshold = 10
max_content_bytes = 1048576
"#;
