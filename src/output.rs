//! Output formatting for Claude Code hook responses
//!
//! Holds the aggregated `Decision` and its two renderings: the host's hook JSON
//! and a plain-text listing.

use serde::Serialize;

use crate::engine::matcher::Signal;
use crate::rules::Priority;

/// One rendered rule activation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Activation {
    /// Name of the rule that fired
    pub rule: String,

    pub priority: Priority,

    /// Rendered message text
    pub message: String,

    /// What made the rule match
    pub signals: Vec<Signal>,
}

/// Aggregated result of evaluating all rules against one context
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Suggest matches, highest priority first
    pub suggestions: Vec<Activation>,

    /// Warn matches, highest priority first
    pub warnings: Vec<Activation>,

    /// Highest-priority non-suppressed Block match
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block: Option<Activation>,
}

impl Decision {
    /// No suggestions, no warnings, no block
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty() && self.warnings.is_empty() && self.block.is_none()
    }

    pub fn is_blocked(&self) -> bool {
        self.block.is_some()
    }

    /// The rendered blocking message, if any
    pub fn blocking_message(&self) -> Option<&str> {
        self.block.as_ref().map(|b| b.message.as_str())
    }

    /// Report a firing block as a warning instead (dry-run mode)
    pub fn demote_block(mut self) -> Self {
        if let Some(block) = self.block.take() {
            self.warnings.insert(0, block);
        }
        self
    }

    /// Plain-text listing, one activation per line
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();
        if let Some(block) = &self.block {
            lines.push(format!("BLOCK [{}] {}", block.rule, block.message));
        }
        for warning in &self.warnings {
            lines.push(format!("WARN [{}] {}", warning.rule, warning.message));
        }
        for suggestion in &self.suggestions {
            lines.push(format!("SUGGEST [{}] {}", suggestion.rule, suggestion.message));
        }
        lines.join("\n")
    }

    /// Context text handed to the assistant for non-blocking activations
    fn additional_context(&self) -> Option<String> {
        let mut sections = Vec::new();

        if !self.suggestions.is_empty() {
            let mut section = String::from("Relevant skills for this request:");
            for suggestion in &self.suggestions {
                section.push_str(&format!("\n- [{}] {}", suggestion.rule, suggestion.message));
            }
            sections.push(section);
        }

        if !self.warnings.is_empty() {
            let mut section = String::from("Warnings:");
            for warning in &self.warnings {
                section.push_str(&format!("\n- [{}] {}", warning.rule, warning.message));
            }
            sections.push(section);
        }

        (!sections.is_empty()).then(|| sections.join("\n\n"))
    }
}

/// Main output structure for Claude Code hooks
#[derive(Debug, Serialize)]
pub struct HookOutput {
    /// "block" when the event is rejected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<String>,

    /// Blocking message shown to the assistant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    /// Hook-specific output carrying the suggestion context
    #[serde(rename = "hookSpecificOutput", skip_serializing_if = "Option::is_none")]
    pub hook_specific_output: Option<HookSpecificOutput>,

    /// Optional system message to show the user
    #[serde(rename = "systemMessage", skip_serializing_if = "Option::is_none")]
    pub system_message: Option<String>,
}

/// Hook-specific output with context for the assistant
#[derive(Debug, Serialize)]
pub struct HookSpecificOutput {
    /// The hook event name (e.g., "UserPromptSubmit")
    #[serde(rename = "hookEventName")]
    pub hook_event_name: String,

    #[serde(rename = "additionalContext")]
    pub additional_context: String,
}

impl HookOutput {
    /// Nothing to report (empty output)
    pub fn empty() -> Self {
        HookOutput {
            decision: None,
            reason: None,
            hook_specific_output: None,
            system_message: None,
        }
    }

    /// Create output from a Decision
    pub fn from_decision(decision: &Decision, hook_event_name: &str) -> Self {
        let mut output = HookOutput::empty();

        if let Some(block) = &decision.block {
            output.decision = Some("block".to_string());
            output.reason = Some(format!("[{}] {}", block.rule, block.message));
        }

        output.hook_specific_output = decision
            .additional_context()
            .map(|additional_context| HookSpecificOutput {
                hook_event_name: hook_event_name.to_string(),
                additional_context,
            });

        if !decision.warnings.is_empty() {
            let messages: Vec<String> = decision
                .warnings
                .iter()
                .map(|w| format!("[skills:{}] Warning: {}", w.rule, w.message))
                .collect();
            output.system_message = Some(messages.join("\n"));
        }

        output
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}
