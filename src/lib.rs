//! skill-activator - Contextual skill activation for Claude Code hooks
//!
//! Decides which skills to surface for a hook event. A submitted prompt or a
//! completed file edit is matched against a declarative rule file, and the
//! matches are aggregated into suggestions, warnings, and at most one block.
//!
//! # Features
//!
//! - **Keyword matching**: case-insensitive substring match on the prompt
//! - **Intent patterns**: case-insensitive regexes anywhere in the prompt
//! - **Path globs**: `**`-aware globs against the edited file
//! - **Content analysis**: structural checks on edited files feed synthetic keywords
//! - **Skip overrides**: skip markers and environment variables bypass block rules
//! - **Audit logging**: optional JSONL log of all decisions
//!
//! # Example
//!
//! ```
//! use skill_activator::{ActivationEngine, EnvSnapshot, HookEvent, RuleStore};
//!
//! let rules = RuleStore::parse(r#"{"skills": [
//!     {"name": "backend-dev-guidelines", "type": "suggest", "priority": "high",
//!      "keywords": ["fastapi", "endpoint"]}
//! ]}"#).unwrap();
//! let engine = ActivationEngine::new(rules.rules);
//!
//! let event = HookEvent::from_json(r#"{"prompt":"add a FastAPI endpoint"}"#).unwrap();
//! let decision = engine.evaluate_event(&event, EnvSnapshot::empty());
//! assert_eq!(decision.suggestions[0].rule, "backend-dev-guidelines");
//! ```

pub mod analyzer;
pub mod audit;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod input;
pub mod logging;
pub mod output;
pub mod rules;

// Re-exports for convenience
pub use analyzer::ContentAnalyzer;
pub use config::Config;
pub use context::{ActivationContext, EnvSnapshot};
pub use engine::ActivationEngine;
pub use error::{AnalyzerCheckError, ConfigurationError, InvalidEventError, RuleValidationWarning};
pub use input::HookEvent;
pub use output::{Activation, Decision, HookOutput};
pub use rules::{ActivationType, Priority, Rule, RuleSet, RuleStore};
