//! Rule store: loads and validates the rule-set document
//!
//! A broken entry only costs that entry (or that pattern). A broken document
//! costs the whole rule set, which the caller treats as empty.

use std::path::Path;

use glob::Pattern;
use regex::RegexBuilder;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::{ActivationType, GlobalSettings, Priority, Rule, RuleSet};
use crate::error::{ConfigurationError, RuleValidationWarning};

/// One entry of the `skills` array, before validation
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRule {
    name: Option<String>,

    #[serde(rename = "type", alias = "activationType")]
    activation_type: Option<String>,

    priority: Option<String>,

    description: Option<String>,

    // List fields stay untyped so one bad item only costs that item
    #[serde(default)]
    keywords: Option<Vec<Value>>,

    #[serde(default)]
    intent_patterns: Option<Vec<Value>>,

    #[serde(default)]
    file_paths: Option<Vec<Value>>,

    message: Option<String>,

    block_message: Option<String>,

    #[serde(default)]
    skip_markers: Option<Vec<Value>>,

    skip_env_var: Option<String>,
}

/// The `globalSettings` block
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSettings {
    enable_skill_suggestions: Option<bool>,
    max_suggestions_per_prompt: Option<usize>,
    priority_order: Option<Vec<String>>,
}

/// A loaded rule set together with everything that was dropped on the way
#[derive(Debug, Default)]
pub struct LoadedRules {
    pub rules: RuleSet,
    pub warnings: Vec<RuleValidationWarning>,
}

impl LoadedRules {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Reads rule-set documents. Stateless: every call re-reads the source.
pub struct RuleStore;

impl RuleStore {
    /// Load from a file, degrading to an empty rule set on any document-level error.
    pub fn load(path: &Path) -> LoadedRules {
        match Self::read(path) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "rule set unavailable, continuing with zero rules");
                LoadedRules::empty()
            }
        }
    }

    /// Load from a file
    pub fn read(path: &Path) -> Result<LoadedRules, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigurationError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let loaded = Self::parse(&content)?;
        debug!(
            path = %path.display(),
            rules = loaded.rules.len(),
            warnings = loaded.warnings.len(),
            "loaded rule set"
        );
        Ok(loaded)
    }

    /// Parse a rule-set document
    pub fn parse(json: &str) -> Result<LoadedRules, ConfigurationError> {
        let document: Value = serde_json::from_str(json)?;

        let object = document
            .as_object()
            .ok_or_else(|| ConfigurationError::Structure("top level must be an object".to_string()))?;

        let entries = match object.get("skills") {
            Some(Value::Array(entries)) => entries,
            Some(_) => {
                return Err(ConfigurationError::Structure(
                    "`skills` must be an array".to_string(),
                ))
            }
            None => {
                return Err(ConfigurationError::Structure(
                    "missing `skills` array".to_string(),
                ))
            }
        };

        let settings = parse_settings(object.get("globalSettings"));

        let mut warnings = Vec::new();
        let mut rules: Vec<Rule> = Vec::with_capacity(entries.len());

        for (index, entry) in entries.iter().enumerate() {
            if let Some(rule) = validate_entry(index, entry, &mut warnings) {
                if rules.iter().any(|r| r.name == rule.name) {
                    warnings.push(RuleValidationWarning::DuplicateName {
                        index,
                        name: rule.name,
                    });
                    continue;
                }
                rules.push(rule);
            }
        }

        for warning in &warnings {
            warn!(rule = warning.rule_name().unwrap_or("?"), "{}", warning);
        }

        Ok(LoadedRules {
            rules: RuleSet::new(rules, settings),
            warnings,
        })
    }
}

fn parse_settings(value: Option<&Value>) -> GlobalSettings {
    let raw = match value {
        None | Some(Value::Null) => RawSettings::default(),
        Some(value) => match RawSettings::deserialize(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "ignoring malformed globalSettings");
                RawSettings::default()
            }
        },
    };

    if let Some(order) = &raw.priority_order {
        let parsed: Vec<Option<Priority>> = order.iter().map(|p| Priority::parse(p)).collect();
        let canonical: Vec<Option<Priority>> = Priority::ORDER.iter().copied().map(Some).collect();
        if parsed != canonical {
            warn!(
                ?order,
                "priorityOrder differs from critical > high > medium > low; the fixed order is used"
            );
        }
    }

    let defaults = GlobalSettings::default();
    GlobalSettings {
        enable_skill_suggestions: raw
            .enable_skill_suggestions
            .unwrap_or(defaults.enable_skill_suggestions),
        max_suggestions_per_prompt: raw.max_suggestions_per_prompt,
    }
}

/// String items of a list field. `null` is an empty list; non-strings are dropped.
fn string_items(
    rule: &str,
    field: &'static str,
    items: Option<Vec<Value>>,
    warnings: &mut Vec<RuleValidationWarning>,
) -> Vec<String> {
    let mut strings = Vec::new();
    for item in items.unwrap_or_default() {
        match item {
            Value::String(s) => strings.push(s),
            other => warnings.push(RuleValidationWarning::NonStringItem {
                rule: rule.to_string(),
                field,
                value: other.to_string(),
            }),
        }
    }
    strings
}

/// Validate one entry. Returns `None` when the whole entry is dropped.
fn validate_entry(
    index: usize,
    entry: &Value,
    warnings: &mut Vec<RuleValidationWarning>,
) -> Option<Rule> {
    if !entry.is_object() {
        warnings.push(RuleValidationWarning::NotAnObject { index });
        return None;
    }

    let raw = match RawRule::deserialize(entry) {
        Ok(raw) => raw,
        Err(e) => {
            let name = entry
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or("?")
                .to_string();
            warnings.push(RuleValidationWarning::Malformed {
                index,
                name,
                message: e.to_string(),
            });
            return None;
        }
    };

    let name = match raw.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            warnings.push(RuleValidationWarning::MissingField {
                index,
                field: "name",
            });
            return None;
        }
    };

    let activation = match raw.activation_type.as_deref() {
        None => {
            warnings.push(RuleValidationWarning::MissingField {
                index,
                field: "type",
            });
            return None;
        }
        Some(value) => match ActivationType::parse(value) {
            Some(activation) => activation,
            None => {
                warnings.push(RuleValidationWarning::InvalidField {
                    index,
                    name,
                    field: "type",
                    value: value.to_string(),
                });
                return None;
            }
        },
    };

    let priority = match raw.priority.as_deref() {
        None => Priority::default(),
        Some(value) => match Priority::parse(value) {
            Some(priority) => priority,
            None => {
                warnings.push(RuleValidationWarning::InvalidField {
                    index,
                    name,
                    field: "priority",
                    value: value.to_string(),
                });
                return None;
            }
        },
    };

    let raw_keywords = string_items(&name, "keywords", raw.keywords, warnings);
    let raw_intents = string_items(&name, "intentPatterns", raw.intent_patterns, warnings);
    let raw_globs = string_items(&name, "filePaths", raw.file_paths, warnings);
    let raw_markers = string_items(&name, "skipMarkers", raw.skip_markers, warnings);

    let mut keywords: Vec<String> = Vec::with_capacity(raw_keywords.len());
    for keyword in &raw_keywords {
        let folded = keyword.to_lowercase();
        if folded.trim().is_empty() {
            warnings.push(RuleValidationWarning::EmptyKeyword { rule: name.clone() });
            continue;
        }
        if !keywords.contains(&folded) {
            keywords.push(folded);
        }
    }

    let mut intent_patterns = Vec::with_capacity(raw_intents.len());
    for pattern in &raw_intents {
        match RegexBuilder::new(pattern).case_insensitive(true).build() {
            Ok(regex) => intent_patterns.push(regex),
            Err(e) => warnings.push(RuleValidationWarning::InvalidPattern {
                rule: name.clone(),
                pattern: pattern.clone(),
                message: e.to_string(),
            }),
        }
    }

    let mut file_paths = Vec::with_capacity(raw_globs.len());
    for glob in &raw_globs {
        let normalized = glob.trim_start_matches("./");
        match Pattern::new(normalized) {
            Ok(pattern) => file_paths.push(pattern),
            Err(e) => warnings.push(RuleValidationWarning::InvalidGlob {
                rule: name.clone(),
                glob: glob.clone(),
                message: e.to_string(),
            }),
        }
    }

    let skip_markers = raw_markers
        .into_iter()
        .filter(|m| !m.is_empty())
        .collect();

    let skip_env_var = raw
        .skip_env_var
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());

    Some(Rule {
        name,
        order: index,
        activation,
        priority,
        description: raw.description,
        keywords,
        intent_patterns,
        file_paths,
        message: raw.message,
        block_message: raw.block_message,
        skip_markers,
        skip_env_var,
    })
}
