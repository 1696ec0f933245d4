//! Activation engine for skill-activator
//!
//! Coordinates one evaluation: enrich the context with analyzer signals,
//! match every rule, then aggregate into a `Decision`.

pub mod aggregate;
pub mod matcher;

use tracing::debug;

use crate::analyzer::ContentAnalyzer;
use crate::context::{ActivationContext, EnvSnapshot};
use crate::input::HookEvent;
use crate::output::Decision;
use crate::rules::RuleSet;

/// The main activation engine
pub struct ActivationEngine {
    rules: RuleSet,
    analyzer: ContentAnalyzer,
}

impl ActivationEngine {
    /// Create an engine over a loaded rule set with the default analyzer
    pub fn new(rules: RuleSet) -> Self {
        Self::with_analyzer(rules, ContentAnalyzer::default())
    }

    pub fn with_analyzer(rules: RuleSet, analyzer: ContentAnalyzer) -> Self {
        Self { rules, analyzer }
    }

    /// Main entry point: evaluate a context and return a decision
    pub fn evaluate(&self, mut context: ActivationContext) -> Decision {
        self.analyzer.enrich(&mut context);

        let matches = matcher::match_all(self.rules.rules(), &context);
        debug!(
            rules = self.rules.len(),
            matched = matches.len(),
            signals = ?context.structural_signals(),
            "evaluated rules"
        );

        aggregate::aggregate(matches, &context, self.rules.settings())
    }

    /// Extract the context from a hook event and evaluate it
    pub fn evaluate_event(&self, event: &HookEvent, env: EnvSnapshot) -> Decision {
        self.evaluate(ActivationContext::from_event(event, env, None))
    }

    /// Like `evaluate_event`, with edited paths also matched relative to `project_root`
    pub fn evaluate_event_in(
        &self,
        event: &HookEvent,
        env: EnvSnapshot,
        project_root: Option<&str>,
    ) -> Decision {
        self.evaluate(ActivationContext::from_event(event, env, project_root))
    }

    /// Capture exactly the environment variables this rule set can consult
    pub fn capture_env(&self) -> EnvSnapshot {
        EnvSnapshot::capture(self.rules.skip_env_vars())
    }

    /// Get the rule set
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}
