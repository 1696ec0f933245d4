//! Rule matching
//!
//! Evaluates one rule against one context. A rule matches when any keyword,
//! any intent pattern, or any path glob matches.

use glob::MatchOptions;
use serde::Serialize;

use crate::context::ActivationContext;
use crate::rules::Rule;

/// `*` stays within a path segment, `**` spans segments
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// The evidence that made a rule match
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Signal {
    /// Keyword found as a substring of the prompt
    Keyword(String),

    /// Intent pattern (source text) that matched the prompt
    Intent(String),

    /// Path glob (source text) that matched the active file
    Path(String),

    /// Keyword supplied by the content analyzer
    Structural(String),
}

/// Why a Block match was bypassed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Suppression {
    /// Skip marker found in the prompt or file content
    Marker(String),

    /// Skip environment variable set to a truthy value
    EnvVar(String),
}

/// Result of evaluating one rule against one context
#[derive(Debug, Clone)]
pub struct MatchResult<'r> {
    pub rule: &'r Rule,
    pub signals: Vec<Signal>,
    /// Set by the aggregator for Block rules whose skip condition holds
    pub suppressed: Option<Suppression>,
}

impl<'r> MatchResult<'r> {
    pub fn is_suppressed(&self) -> bool {
        self.suppressed.is_some()
    }
}

/// Evaluate `rule` against `context`, recording every matching signal
pub fn match_rule<'r>(rule: &'r Rule, context: &ActivationContext) -> Option<MatchResult<'r>> {
    let mut signals = Vec::new();

    if let Some(prompt) = context.prompt_text() {
        let folded = prompt.to_lowercase();

        for keyword in &rule.keywords {
            if folded.contains(keyword.as_str()) {
                signals.push(Signal::Keyword(keyword.clone()));
            }
        }

        for pattern in &rule.intent_patterns {
            if pattern.is_match(prompt) {
                signals.push(Signal::Intent(pattern.as_str().to_string()));
            }
        }
    }

    for keyword in &rule.keywords {
        if context.has_signal(keyword) {
            signals.push(Signal::Structural(keyword.clone()));
        }
    }

    if let Some(glob) = rule
        .file_paths
        .iter()
        .find(|glob| context.path_candidates().any(|p| glob.matches_with(p, GLOB_OPTIONS)))
    {
        signals.push(Signal::Path(glob.as_str().to_string()));
    }

    if signals.is_empty() {
        return None;
    }

    Some(MatchResult {
        rule,
        signals,
        suppressed: None,
    })
}

/// Evaluate every rule in declaration order
pub fn match_all<'r>(rules: &'r [Rule], context: &ActivationContext) -> Vec<MatchResult<'r>> {
    rules
        .iter()
        .filter_map(|rule| match_rule(rule, context))
        .collect()
}
