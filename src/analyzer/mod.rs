//! Post-edit content analyzer
//!
//! Runs a fixed registry of independent structural checks over edited file
//! content. Each check yields synthetic keywords that are unioned into the
//! activation context, so ordinary keyword rules can react to them. The
//! analyzer knows nothing about rules.

pub mod checks;
pub mod secrets;

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::config::AnalyzerConfig;
use crate::context::ActivationContext;
use crate::error::AnalyzerCheckError;

/// What a check gets to look at
#[derive(Debug, Clone, Copy)]
pub struct AnalysisInput<'a> {
    /// Normalized path of the edited file, when known
    pub path: Option<&'a str>,

    pub content: &'a str,

    pub complexity_threshold: u32,
}

/// Signature of a structural check
pub type CheckFn = fn(&AnalysisInput<'_>) -> Result<BTreeSet<String>, AnalyzerCheckError>;

/// A named entry in the check registry
#[derive(Debug, Clone, Copy)]
pub struct StructuralCheck {
    pub name: &'static str,
    pub run: CheckFn,
}

/// The built-in checks
pub const BUILTIN_CHECKS: &[StructuralCheck] = &[
    StructuralCheck {
        name: checks::ASYNC_WITHOUT_AWAIT,
        run: checks::async_without_await,
    },
    StructuralCheck {
        name: checks::MISSING_TYPE_HINT,
        run: checks::missing_type_hint,
    },
    StructuralCheck {
        name: checks::MISSING_TEST_REFERENCE,
        run: checks::missing_test_reference,
    },
    StructuralCheck {
        name: checks::DEPENDENCY_CHANGE,
        run: checks::dependency_change,
    },
    StructuralCheck {
        name: checks::HIGH_COMPLEXITY,
        run: checks::high_complexity,
    },
    StructuralCheck {
        name: checks::HARDCODED_SECRET,
        run: checks::hardcoded_secret,
    },
];

/// Outcome of one analyzer pass
#[derive(Debug, Default)]
pub struct AnalysisReport {
    pub signals: BTreeSet<String>,
    pub failures: Vec<AnalyzerCheckError>,
}

/// Runs the enabled checks
#[derive(Debug, Clone)]
pub struct ContentAnalyzer {
    checks: Vec<StructuralCheck>,
    complexity_threshold: u32,
    max_content_bytes: usize,
}

impl Default for ContentAnalyzer {
    fn default() -> Self {
        Self::new(&AnalyzerConfig::default())
    }
}

impl ContentAnalyzer {
    /// Built-in checks minus the disabled ones; none when the analyzer is off
    pub fn new(config: &AnalyzerConfig) -> Self {
        let checks = if config.enabled {
            BUILTIN_CHECKS
                .iter()
                .filter(|c| !config.disabled_checks.iter().any(|d| d == c.name))
                .copied()
                .collect()
        } else {
            Vec::new()
        };

        Self {
            checks,
            complexity_threshold: config.complexity_threshold,
            max_content_bytes: config.max_content_bytes,
        }
    }

    /// Replace the registry (custom or test checks)
    pub fn with_checks(mut self, checks: Vec<StructuralCheck>) -> Self {
        self.checks = checks;
        self
    }

    pub fn check_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.checks.iter().map(|c| c.name)
    }

    /// Run every check; a failing check is logged and skipped
    pub fn analyze(&self, path: Option<&str>, content: &str) -> AnalysisReport {
        let mut report = AnalysisReport::default();

        if content.len() > self.max_content_bytes {
            debug!(
                bytes = content.len(),
                limit = self.max_content_bytes,
                "content too large, skipping analysis"
            );
            return report;
        }

        let input = AnalysisInput {
            path,
            content,
            complexity_threshold: self.complexity_threshold,
        };

        for check in &self.checks {
            match (check.run)(&input) {
                Ok(signals) => {
                    if !signals.is_empty() {
                        debug!(check = check.name, ?signals, "check produced signals");
                    }
                    report.signals.extend(signals);
                }
                Err(e) => {
                    warn!(check = check.name, path = path.unwrap_or("-"), error = %e, "analyzer check skipped");
                    report.failures.push(e);
                }
            }
        }

        report
    }

    /// Add synthetic keywords to a context that carries file content
    pub fn enrich(&self, context: &mut ActivationContext) -> AnalysisReport {
        let Some(content) = context.file_content() else {
            return AnalysisReport::default();
        };
        let path = context.path_candidates().next();
        let report = self.analyze(path, content);
        context.add_signals(report.signals.iter().cloned());
        report
    }
}
