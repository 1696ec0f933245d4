//! Input parsing for Claude Code hook JSON format
//!
//! The host sends either a prompt-submit payload or a post-edit payload. Both
//! are parsed into the `HookEvent` tagged union.

use serde::Deserialize;
use serde_json::Value;

use crate::error::InvalidEventError;

/// Common envelope fields sent with every hook payload
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Hook event name (e.g., "UserPromptSubmit", "PostToolUse")
    #[serde(default)]
    pub hook_event_name: Option<String>,

    /// Optional session identifier
    #[serde(default)]
    pub session_id: Option<String>,

    /// Working directory of the host session
    #[serde(default)]
    pub cwd: Option<String>,
}

/// A submitted user prompt
#[derive(Debug, Clone)]
pub struct PromptEvent {
    pub prompt: String,
    pub envelope: Envelope,
}

/// A completed file edit
#[derive(Debug, Clone)]
pub struct FileEditEvent {
    /// Tool that performed the edit (e.g., "Edit", "Write")
    pub tool_name: String,

    pub edit: EditInput,

    /// Full file content after the edit, when known
    pub content: Option<String>,

    pub envelope: Envelope,
}

impl FileEditEvent {
    pub fn file_path(&self) -> &str {
        self.edit.file_path()
    }

    /// Text introduced by the edit itself, used when no full snapshot exists
    pub fn edited_text(&self) -> Option<String> {
        self.edit.edited_text()
    }
}

/// Tool-specific edit parameters
#[derive(Debug, Clone)]
pub enum EditInput {
    /// Whole-file write
    Write { file_path: String, content: String },

    /// Single string replacement
    Edit {
        file_path: String,
        old_string: String,
        new_string: String,
    },

    /// Several replacements in one file
    MultiEdit {
        file_path: String,
        new_strings: Vec<String>,
    },

    /// Anything else that names a file (e.g., NotebookEdit)
    Other { file_path: String },
}

impl<'de> Deserialize<'de> for EditInput {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let value = Value::deserialize(deserializer)?;
        let obj = value
            .as_object()
            .ok_or_else(|| D::Error::custom("tool_input must be an object"))?;

        let file_path = obj
            .get("file_path")
            .or_else(|| obj.get("notebook_path"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| D::Error::custom("tool_input has no file_path"))?
            .to_string();

        // Write has content
        if let Some(content) = obj.get("content").and_then(|v| v.as_str()) {
            return Ok(EditInput::Write {
                file_path,
                content: content.to_string(),
            });
        }

        // Edit has old_string and new_string
        if let (Some(old_string), Some(new_string)) = (
            obj.get("old_string").and_then(|v| v.as_str()),
            obj.get("new_string").and_then(|v| v.as_str()),
        ) {
            return Ok(EditInput::Edit {
                file_path,
                old_string: old_string.to_string(),
                new_string: new_string.to_string(),
            });
        }

        // MultiEdit has a list of edits
        if let Some(edits) = obj.get("edits").and_then(|v| v.as_array()) {
            let new_strings = edits
                .iter()
                .filter_map(|e| e.get("new_string").and_then(|v| v.as_str()))
                .map(String::from)
                .collect();
            return Ok(EditInput::MultiEdit {
                file_path,
                new_strings,
            });
        }

        Ok(EditInput::Other { file_path })
    }
}

impl EditInput {
    pub fn file_path(&self) -> &str {
        match self {
            EditInput::Write { file_path, .. }
            | EditInput::Edit { file_path, .. }
            | EditInput::MultiEdit { file_path, .. }
            | EditInput::Other { file_path } => file_path,
        }
    }

    pub fn edited_text(&self) -> Option<String> {
        match self {
            EditInput::Write { content, .. } => Some(content.clone()),
            EditInput::Edit { new_string, .. } => Some(new_string.clone()),
            EditInput::MultiEdit { new_strings, .. } if !new_strings.is_empty() => {
                Some(new_strings.join("\n"))
            }
            EditInput::MultiEdit { .. } | EditInput::Other { .. } => None,
        }
    }
}

/// One hook invocation
#[derive(Debug, Clone)]
pub enum HookEvent {
    PromptSubmit(PromptEvent),
    FileEdit(FileEditEvent),
}

impl HookEvent {
    /// Parse a hook payload
    pub fn from_json(json: &str) -> Result<Self, InvalidEventError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Classify an already-parsed payload
    pub fn from_value(value: Value) -> Result<Self, InvalidEventError> {
        if !value.is_object() {
            return Err(InvalidEventError::Shape(
                "payload must be a JSON object".to_string(),
            ));
        }

        let envelope = Envelope::deserialize(&value)?;

        if let Some(prompt) = value.get("prompt").and_then(|v| v.as_str()) {
            return Ok(HookEvent::PromptSubmit(PromptEvent {
                prompt: prompt.to_string(),
                envelope,
            }));
        }

        if let Some(tool_input) = value.get("tool_input") {
            let edit = EditInput::deserialize(tool_input)?;
            let tool_name = value
                .get("tool_name")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown")
                .to_string();
            let content = match &edit {
                EditInput::Write { content, .. } => Some(content.clone()),
                _ => None,
            };
            return Ok(HookEvent::FileEdit(FileEditEvent {
                tool_name,
                edit,
                content,
                envelope,
            }));
        }

        Err(InvalidEventError::Shape(
            "expected a `prompt` or a `tool_input` with a file path".to_string(),
        ))
    }

    pub fn envelope(&self) -> &Envelope {
        match self {
            HookEvent::PromptSubmit(e) => &e.envelope,
            HookEvent::FileEdit(e) => &e.envelope,
        }
    }

    /// Event name to echo back to the host
    pub fn event_name(&self) -> &str {
        if let Some(name) = self.envelope().hook_event_name.as_deref() {
            return name;
        }
        match self {
            HookEvent::PromptSubmit(_) => "UserPromptSubmit",
            HookEvent::FileEdit(_) => "PostToolUse",
        }
    }

    /// Get a summary of the input for logging
    pub fn summary(&self) -> String {
        match self {
            HookEvent::PromptSubmit(e) => {
                let truncated: String = e.prompt.chars().take(100).collect();
                if truncated.len() < e.prompt.len() {
                    format!("Prompt: {}...", truncated)
                } else {
                    format!("Prompt: {}", truncated)
                }
            }
            HookEvent::FileEdit(e) => format!("{}: {}", e.tool_name, e.file_path()),
        }
    }
}
