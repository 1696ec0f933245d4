//! Context extraction
//!
//! Normalizes a `HookEvent` into the `ActivationContext` every matcher sees.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use tracing::debug;

use crate::input::HookEvent;

/// Environment values relevant to skip overrides
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Read the named variables from the process environment
    pub fn capture<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let vars = names
            .into_iter()
            .filter_map(|name| std::env::var(name).ok().map(|v| (name.to_string(), v)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Set, non-empty, and not "0" or "false"
    pub fn is_truthy(&self, name: &str) -> bool {
        match self.get(name).map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(value) => !value.eq_ignore_ascii_case("false"),
        }
    }
}

/// Everything the matcher needs to know about one event
#[derive(Debug, Clone, Default)]
pub struct ActivationContext {
    prompt_text: Option<String>,

    /// Normalized path as sent by the host
    active_file_path: Option<String>,

    /// Same path relative to the session working directory, when inside it
    relative_file_path: Option<String>,

    file_content: Option<String>,

    env: EnvSnapshot,

    /// Synthetic keywords added by the content analyzer
    structural_signals: BTreeSet<String>,
}

impl ActivationContext {
    /// Context for a submitted prompt
    pub fn for_prompt(prompt: &str) -> Self {
        let trimmed = prompt.trim();
        Self {
            prompt_text: (!trimmed.is_empty()).then(|| trimmed.to_string()),
            ..Self::default()
        }
    }

    /// Context for an edited file
    pub fn for_file(path: &str, content: Option<String>) -> Self {
        Self {
            active_file_path: Some(normalize_path(path)),
            file_content: content,
            ..Self::default()
        }
    }

    /// Extract a context from a hook event. Pure: no I/O.
    ///
    /// Edited paths are also made relative to `project_root`, or to the
    /// payload's `cwd` when no root is given.
    pub fn from_event(event: &HookEvent, env: EnvSnapshot, project_root: Option<&str>) -> Self {
        let context = match event {
            HookEvent::PromptSubmit(prompt) => Self::for_prompt(&prompt.prompt),
            HookEvent::FileEdit(edit) => {
                let content = edit.content.clone().or_else(|| edit.edited_text());
                let context = Self::for_file(edit.file_path(), content);
                match project_root.or(edit.envelope.cwd.as_deref()) {
                    Some(root) => context.with_project_root(root),
                    None => context,
                }
            }
        };
        context.with_env(env)
    }

    pub fn with_env(mut self, env: EnvSnapshot) -> Self {
        self.env = env;
        self
    }

    /// Also expose the active path relative to `root`, when it lies inside it
    pub fn with_project_root(mut self, root: &str) -> Self {
        if let Some(path) = &self.active_file_path {
            let root = normalize_path(root);
            let root = root.trim_end_matches('/');
            if !root.is_empty() {
                if let Some(rest) = path.strip_prefix(root).and_then(|r| r.strip_prefix('/')) {
                    self.relative_file_path = Some(rest.to_string());
                }
            }
        }
        self
    }

    /// Union synthetic keywords into the context
    pub fn add_signals(&mut self, signals: impl IntoIterator<Item = String>) {
        self.structural_signals
            .extend(signals.into_iter().map(|s| s.to_lowercase()));
    }

    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt_text.as_deref()
    }

    pub fn active_file_path(&self) -> Option<&str> {
        self.active_file_path.as_deref()
    }

    /// The path forms a glob may match against, most specific first
    pub fn path_candidates(&self) -> impl Iterator<Item = &str> {
        self.relative_file_path
            .as_deref()
            .into_iter()
            .chain(self.active_file_path.as_deref())
    }

    pub fn file_content(&self) -> Option<&str> {
        self.file_content.as_deref()
    }

    pub fn env(&self) -> &EnvSnapshot {
        &self.env
    }

    pub fn structural_signals(&self) -> &BTreeSet<String> {
        &self.structural_signals
    }

    pub fn has_signal(&self, keyword: &str) -> bool {
        self.structural_signals.contains(keyword)
    }

    /// Whether the raw event text (prompt or file content) contains `marker`
    pub fn contains_marker(&self, marker: &str) -> bool {
        self.prompt_text
            .as_deref()
            .into_iter()
            .chain(self.file_content.as_deref())
            .any(|text| text.contains(marker))
    }
}

/// Normalize a file path for glob matching
pub fn normalize_path(path: &str) -> String {
    let unified = path.trim().replace('\\', "/");
    let mut rest = unified.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

/// Read the post-edit file snapshot from disk
pub fn read_snapshot(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no file snapshot available");
            None
        }
    }
}
