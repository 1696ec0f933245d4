//! Integration tests for skip overrides, block aggregation and rule reloading

use std::io::Write;

use skill_activator::{Config, EnvSnapshot, RuleStore};
use tempfile::NamedTempFile;

use super::{decide, decide_with_env, rule_names, write_payload, RULES};

const SECRET_FILE: &str = "DB_PASSWORD = \"correct-horse\"\npassword = \"hunter2\"\n";

// ============================================================================
// Skip markers
// ============================================================================

#[test]
fn test_skip_marker_suppresses_block() {
    let content = format!("# @allow-secret fixture credentials\n{}", SECRET_FILE);
    let decision = decide(RULES, &write_payload("tests/fixtures.py", &content));
    assert!(!decision.is_blocked());
}

#[test]
fn test_skip_marker_is_case_sensitive() {
    let content = format!("# @ALLOW-SECRET\n{}", SECRET_FILE);
    let decision = decide(RULES, &write_payload("tests/fixtures.py", &content));
    assert!(decision.is_blocked());
}

#[test]
fn test_skip_marker_does_not_apply_to_warn_rules() {
    let rules = r#"{"skills": [
        {"name": "w", "type": "warn", "keywords": ["migrate"], "skipMarkers": ["@quiet"]}
    ]}"#;
    let decision = decide(rules, &super::prompt_payload("migrate the db @quiet"));
    assert_eq!(rule_names(&decision.warnings), vec!["w"]);
}

// ============================================================================
// Skip environment variables
// ============================================================================

#[test]
fn test_skip_env_var_truthy_suppresses_block() {
    let payload = write_payload("app/config.py", SECRET_FILE);
    for value in ["1", "true", "yes"] {
        let env = EnvSnapshot::from_pairs([("SKIP_SECRET_CHECK", value)]);
        assert!(!decide_with_env(RULES, &payload, env).is_blocked(), "{}", value);
    }
}

#[test]
fn test_skip_env_var_falsy_keeps_block() {
    let payload = write_payload("app/config.py", SECRET_FILE);
    for value in ["0", "", "false", "FALSE"] {
        let env = EnvSnapshot::from_pairs([("SKIP_SECRET_CHECK", value)]);
        assert!(decide_with_env(RULES, &payload, env).is_blocked(), "{:?}", value);
    }
    assert!(decide(RULES, &payload).is_blocked());
}

#[test]
fn test_unrelated_env_var_has_no_effect() {
    let payload = write_payload("app/config.py", SECRET_FILE);
    let env = EnvSnapshot::from_pairs([("SKIP_SOMETHING_ELSE", "1")]);
    assert!(decide_with_env(RULES, &payload, env).is_blocked());
}

// ============================================================================
// Block aggregation
// ============================================================================

const THREE_BLOCKS: &str = r#"{"skills": [
    {"name": "low-block", "type": "block", "priority": "low", "filePaths": ["deploy/**"],
     "blockMessage": "low"},
    {"name": "critical-block", "type": "block", "priority": "critical", "filePaths": ["deploy/**"],
     "blockMessage": "critical", "skipEnvVar": "ALLOW_DEPLOY"},
    {"name": "high-block", "type": "block", "priority": "high", "filePaths": ["deploy/**"],
     "blockMessage": "high"}
]}"#;

#[test]
fn test_only_highest_priority_block_fires() {
    let decision = decide(THREE_BLOCKS, &write_payload("deploy/prod.yaml", "replicas: 3\n"));
    let block = decision.block.as_ref().unwrap();
    assert_eq!(block.rule, "critical-block");
    assert_eq!(block.message, "critical");
    assert!(decision.warnings.is_empty());
    assert!(decision.suggestions.is_empty());
}

#[test]
fn test_suppressed_block_falls_through_to_next() {
    let env = EnvSnapshot::from_pairs([("ALLOW_DEPLOY", "1")]);
    let decision = decide_with_env(
        THREE_BLOCKS,
        &write_payload("deploy/prod.yaml", "replicas: 3\n"),
        env,
    );
    assert_eq!(decision.block.as_ref().map(|b| b.rule.as_str()), Some("high-block"));
}

#[test]
fn test_dry_run_demotes_block_to_warning() {
    let decision = decide(THREE_BLOCKS, &write_payload("deploy/prod.yaml", "replicas: 3\n"))
        .demote_block();
    assert!(!decision.is_blocked());
    assert_eq!(rule_names(&decision.warnings), vec!["critical-block"]);
}

// ============================================================================
// Rule file lifecycle
// ============================================================================

#[test]
fn test_rule_file_is_reread_on_every_load() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"skills": [{{"name": "first", "type": "suggest", "keywords": ["x"]}}]}}"#
    )
    .unwrap();
    file.flush().unwrap();

    let loaded = RuleStore::load(file.path());
    assert!(loaded.rules.get("first").is_some());

    std::fs::write(
        file.path(),
        r#"{"skills": [{"name": "second", "type": "warn", "keywords": ["x"]}]}"#,
    )
    .unwrap();

    let reloaded = RuleStore::load(file.path());
    assert!(reloaded.rules.get("first").is_none());
    assert!(reloaded.rules.get("second").is_some());
}

#[test]
fn test_unreadable_rule_file_degrades_to_empty() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{{ this is not json").unwrap();
    file.flush().unwrap();

    assert!(RuleStore::read(file.path()).is_err());
    assert!(RuleStore::load(file.path()).rules.is_empty());
    assert!(RuleStore::load(&file.path().with_extension("missing")).rules.is_empty());
}

#[test]
fn test_default_config_points_at_project_rules() {
    let config = Config::default();
    let path = config.rules_path(Some(std::path::Path::new("/work/proj")));
    assert_eq!(
        path,
        std::path::Path::new("/work/proj/.claude/skills/skill-rules.json")
    );
    assert!(!config.general.audit_log);
    assert!(config.analyzer.enabled);
}
