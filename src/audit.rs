//! JSONL audit logging for skill-activator
//!
//! Records every activation decision to a JSONL file for later analysis.
//! Disabled unless configured.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analyzer::secrets::redact_secrets;
use crate::input::HookEvent;
use crate::output::Decision;

/// Outcome recorded for an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Outcome {
    Blocked,
    Warned,
    Suggested,
    None,
}

impl Outcome {
    pub fn of(decision: &Decision) -> Self {
        if decision.is_blocked() {
            Outcome::Blocked
        } else if !decision.warnings.is_empty() {
            Outcome::Warned
        } else if !decision.suggestions.is_empty() {
            Outcome::Suggested
        } else {
            Outcome::None
        }
    }
}

/// An audit log entry
#[derive(Debug, Serialize)]
pub struct AuditEntry {
    /// Timestamp of the decision
    pub timestamp: DateTime<Utc>,

    pub outcome: Outcome,

    /// Hook event name
    pub event: String,

    /// Summary of the input, secrets redacted
    pub input_summary: String,

    /// Rule that blocked the event (if any)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocked_by: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,

    /// Session ID (if provided)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl AuditEntry {
    /// Create a new audit entry from input and decision
    pub fn new(event: &HookEvent, decision: &Decision) -> Self {
        Self {
            timestamp: Utc::now(),
            outcome: Outcome::of(decision),
            event: event.event_name().to_string(),
            input_summary: redact_secrets(&event.summary()),
            blocked_by: decision.block.as_ref().map(|b| b.rule.clone()),
            warnings: decision.warnings.iter().map(|a| a.rule.clone()).collect(),
            suggestions: decision.suggestions.iter().map(|a| a.rule.clone()).collect(),
            session_id: event.envelope().session_id.clone(),
        }
    }
}

/// Audit logger
#[derive(Default)]
pub struct AuditLogger {
    writer: Option<BufWriter<File>>,
}

impl AuditLogger {
    /// Create a new audit logger
    pub fn new(path: Option<&Path>) -> Self {
        let writer = path.and_then(|p| {
            // Ensure parent directory exists
            if let Some(parent) = p.parent() {
                let _ = std::fs::create_dir_all(parent);
            }

            OpenOptions::new()
                .create(true)
                .append(true)
                .open(p)
                .ok()
                .map(BufWriter::new)
        });

        Self { writer }
    }

    /// Log an audit entry
    pub fn log(&mut self, entry: &AuditEntry) -> Result<(), std::io::Error> {
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(entry)?;
            writeln!(writer, "{}", json)?;
            writer.flush()?;
        }
        Ok(())
    }

    /// Log a decision
    pub fn log_decision(&mut self, event: &HookEvent, decision: &Decision) -> Result<(), std::io::Error> {
        let entry = AuditEntry::new(event, decision);
        self.log(&entry)
    }

    /// Check if logging is enabled
    pub fn is_enabled(&self) -> bool {
        self.writer.is_some()
    }
}
