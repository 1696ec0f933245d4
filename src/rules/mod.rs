//! Skill activation rules
//!
//! A rule maps trigger conditions (keywords, intent patterns, path globs) to an
//! activation type and a message. Rules are immutable once loaded.

pub mod store;

use std::fmt;

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub use store::{LoadedRules, RuleStore};

/// How a matching rule is surfaced to the assistant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivationType {
    /// Non-blocking hint
    Suggest,

    /// Rejects the event unless bypassed
    Block,

    /// Non-blocking caution
    Warn,
}

impl ActivationType {
    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "suggest" => Some(ActivationType::Suggest),
            "block" => Some(ActivationType::Block),
            "warn" => Some(ActivationType::Warn),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ActivationType::Suggest => "suggest",
            ActivationType::Block => "block",
            ActivationType::Warn => "warn",
        }
    }
}

/// Rule priority. Ordering only, never exclusivity.
///
/// Variants are declared from most to least important, so the derived `Ord`
/// sorts `Critical` first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Critical,
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// The fixed precedence order, highest first
    pub const ORDER: [Priority; 4] = [
        Priority::Critical,
        Priority::High,
        Priority::Medium,
        Priority::Low,
    ];

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Some(Priority::Critical),
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Critical => "critical",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated, compiled rule
#[derive(Debug, Clone)]
pub struct Rule {
    /// Unique name within the rule set
    pub name: String,

    /// Position in the rule file, used to break priority ties
    pub order: usize,

    pub activation: ActivationType,

    pub priority: Priority,

    /// Optional free text, available to message templates
    pub description: Option<String>,

    /// Lower-cased, de-duplicated substrings
    pub keywords: Vec<String>,

    /// Case-insensitive, unanchored
    pub intent_patterns: Vec<Regex>,

    /// Path globs (`**` crosses directories, `*` does not)
    pub file_paths: Vec<Pattern>,

    /// Template for Suggest/Warn rules
    pub message: Option<String>,

    /// Template for Block rules
    pub block_message: Option<String>,

    /// Literal tokens that bypass a Block rule
    pub skip_markers: Vec<String>,

    /// Environment variable that bypasses a Block rule when truthy
    pub skip_env_var: Option<String>,
}

impl Rule {
    /// Create a rule with no triggers; mostly useful for building rule sets in code
    pub fn new(name: impl Into<String>, activation: ActivationType, priority: Priority) -> Self {
        Self {
            name: name.into(),
            order: 0,
            activation,
            priority,
            description: None,
            keywords: Vec::new(),
            intent_patterns: Vec::new(),
            file_paths: Vec::new(),
            message: None,
            block_message: None,
            skip_markers: Vec::new(),
            skip_env_var: None,
        }
    }

    /// Render the rule's message for its activation type.
    ///
    /// Block rules prefer `blockMessage`, others prefer `message`; each falls
    /// back to the other, then to the rule name. `{name}` and `{description}`
    /// are substituted. Never fails.
    pub fn render(&self) -> String {
        let (primary, secondary) = match self.activation {
            ActivationType::Block => (&self.block_message, &self.message),
            ActivationType::Suggest | ActivationType::Warn => (&self.message, &self.block_message),
        };

        let template = primary
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .or_else(|| secondary.as_deref().filter(|m| !m.trim().is_empty()));

        match template {
            Some(template) => template
                .replace("{name}", &self.name)
                .replace("{description}", self.description.as_deref().unwrap_or("")),
            None => self.name.clone(),
        }
    }
}

/// Settings from the rule file's `globalSettings` block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobalSettings {
    /// When false, Suggest matches are dropped
    pub enable_skill_suggestions: bool,

    /// Cap on the number of suggestions per Decision
    pub max_suggestions_per_prompt: Option<usize>,
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            enable_skill_suggestions: true,
            max_suggestions_per_prompt: None,
        }
    }
}

/// An ordered, name-unique collection of rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
    settings: GlobalSettings,
}

impl RuleSet {
    /// An empty rule set (what a broken rule file degrades to)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from rules in declaration order. Later duplicates of a name are dropped.
    pub fn new(rules: Vec<Rule>, settings: GlobalSettings) -> Self {
        let mut kept: Vec<Rule> = Vec::with_capacity(rules.len());
        for mut rule in rules {
            if kept.iter().any(|r| r.name == rule.name) {
                continue;
            }
            rule.order = kept.len();
            kept.push(rule);
        }
        Self {
            rules: kept,
            settings,
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn settings(&self) -> &GlobalSettings {
        &self.settings
    }

    pub fn get(&self, name: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.name == name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Environment variables named by Block rules' `skipEnvVar`
    pub fn skip_env_vars(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|r| r.activation == ActivationType::Block)
            .filter_map(|r| r.skip_env_var.as_deref())
    }
}
