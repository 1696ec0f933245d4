//! Decision aggregation
//!
//! Combines match results into one `Decision`: resolves skip overrides for
//! Block rules, orders everything by priority then declaration order, and keeps
//! at most one block.

use tracing::{debug, info};

use super::matcher::{MatchResult, Suppression};
use crate::context::ActivationContext;
use crate::output::{Activation, Decision};
use crate::rules::{ActivationType, GlobalSettings, Rule};

/// Skip condition for a Block rule, if one holds in this context
pub fn suppression_for(rule: &Rule, context: &ActivationContext) -> Option<Suppression> {
    if let Some(marker) = rule
        .skip_markers
        .iter()
        .find(|marker| context.contains_marker(marker))
    {
        return Some(Suppression::Marker(marker.clone()));
    }

    match rule.skip_env_var.as_deref() {
        Some(var) if context.env().is_truthy(var) => Some(Suppression::EnvVar(var.to_string())),
        _ => None,
    }
}

/// Mark Block matches whose skip condition holds
pub fn apply_overrides(matches: &mut [MatchResult<'_>], context: &ActivationContext) {
    for result in matches
        .iter_mut()
        .filter(|m| m.rule.activation == ActivationType::Block)
    {
        result.suppressed = suppression_for(result.rule, context);
        if let Some(suppression) = &result.suppressed {
            info!(rule = %result.rule.name, ?suppression, "block rule bypassed");
        }
    }
}

fn to_activation(result: &MatchResult<'_>) -> Activation {
    Activation {
        rule: result.rule.name.clone(),
        priority: result.rule.priority,
        message: result.rule.render(),
        signals: result.signals.clone(),
    }
}

/// Build the Decision from all match results
pub fn aggregate(
    mut matches: Vec<MatchResult<'_>>,
    context: &ActivationContext,
    settings: &GlobalSettings,
) -> Decision {
    apply_overrides(&mut matches, context);

    // Stable: equal keys keep their relative order
    matches.sort_by_key(|m| (m.rule.priority, m.rule.order));

    let mut decision = Decision::empty();

    for result in &matches {
        let already_listed = |list: &[Activation]| list.iter().any(|a| a.rule == result.rule.name);

        match result.rule.activation {
            ActivationType::Block => {
                if result.is_suppressed() {
                    continue;
                }
                match &decision.block {
                    None => decision.block = Some(to_activation(result)),
                    Some(winner) => debug!(
                        rule = %result.rule.name,
                        winner = %winner.rule,
                        "dropping lower-precedence block"
                    ),
                }
            }
            ActivationType::Warn => {
                if !already_listed(&decision.warnings) {
                    decision.warnings.push(to_activation(result));
                }
            }
            ActivationType::Suggest => {
                if settings.enable_skill_suggestions && !already_listed(&decision.suggestions) {
                    decision.suggestions.push(to_activation(result));
                }
            }
        }
    }

    if let Some(limit) = settings.max_suggestions_per_prompt {
        decision.suggestions.truncate(limit);
    }

    decision
}
