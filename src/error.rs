//! Error types for skill-activator
//!
//! Nothing here is fatal to the host: every error degrades to fewer matches.

use std::path::PathBuf;

use thiserror::Error;

/// The rule-set document (or the tool config) could not be used at all.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("rule set is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("rule set has an invalid structure: {0}")]
    Structure(String),
}

/// A single rule entry (or one of its patterns) was rejected during load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleValidationWarning {
    #[error("rule #{index}: entry is not an object")]
    NotAnObject { index: usize },

    #[error("rule #{index}: missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    #[error("rule #{index} ({name}): invalid `{field}` value {value:?}")]
    InvalidField {
        index: usize,
        name: String,
        field: &'static str,
        value: String,
    },

    #[error("rule #{index} ({name}): {message}")]
    Malformed {
        index: usize,
        name: String,
        message: String,
    },

    #[error("rule #{index}: duplicate name `{name}`, keeping the first definition")]
    DuplicateName { index: usize, name: String },

    #[error("rule `{rule}`: dropping intent pattern {pattern:?}: {message}")]
    InvalidPattern {
        rule: String,
        pattern: String,
        message: String,
    },

    #[error("rule `{rule}`: dropping file path glob {glob:?}: {message}")]
    InvalidGlob {
        rule: String,
        glob: String,
        message: String,
    },

    #[error("rule `{rule}`: dropping empty keyword")]
    EmptyKeyword { rule: String },

    #[error("rule `{rule}`: dropping non-string `{field}` item {value}")]
    NonStringItem {
        rule: String,
        field: &'static str,
        value: String,
    },
}

impl RuleValidationWarning {
    /// Name of the rule this warning is about, when one was readable.
    pub fn rule_name(&self) -> Option<&str> {
        match self {
            RuleValidationWarning::NotAnObject { .. }
            | RuleValidationWarning::MissingField { .. } => None,
            RuleValidationWarning::InvalidField { name, .. }
            | RuleValidationWarning::Malformed { name, .. }
            | RuleValidationWarning::DuplicateName { name, .. } => Some(name),
            RuleValidationWarning::InvalidPattern { rule, .. }
            | RuleValidationWarning::InvalidGlob { rule, .. }
            | RuleValidationWarning::EmptyKeyword { rule }
            | RuleValidationWarning::NonStringItem { rule, .. } => Some(rule),
        }
    }
}

/// The hook payload could not be understood.
#[derive(Debug, Error)]
pub enum InvalidEventError {
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unrecognised event shape: {0}")]
    Shape(String),
}

/// One structural content check could not run to completion.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("check `{check}` failed: {reason}")]
pub struct AnalyzerCheckError {
    pub check: &'static str,
    pub reason: String,
}

impl AnalyzerCheckError {
    pub fn new(check: &'static str, reason: impl Into<String>) -> Self {
        Self {
            check,
            reason: reason.into(),
        }
    }
}
