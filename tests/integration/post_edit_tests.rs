//! Integration tests for post-edit events

use skill_activator::{context, ActivationEngine, EnvSnapshot, HookEvent, HookOutput, RuleStore};
use tempfile::TempDir;

use super::{decide, engine_for, escape, rule_names, write_payload, RULES};

const ASYNC_NO_AWAIT: &str = "async def refresh(feed_id: int) -> None:\n    save(feed_id)\n";

fn multi_edit_payload(file_path: &str) -> String {
    format!(
        r#"{{"hook_event_name":"PostToolUse","tool_name":"MultiEdit","tool_input":{{"file_path":{},"edits":[]}}}}"#,
        escape(file_path)
    )
}

// ============================================================================
// Path globs
// ============================================================================

#[test]
fn test_routes_glob_matches_nested_python_files() {
    for path in ["app/routes/feed.py", "app/routes/v1/feed.py", "./svc/routes/a/b/c.py"] {
        let decision = decide(RULES, &write_payload(path, "x = 1\n"));
        assert_eq!(rule_names(&decision.suggestions), vec!["route-conventions"], "{}", path);
    }
}

#[test]
fn test_routes_glob_rejects_other_files() {
    for path in ["app/routes/feed.txt", "app/routes.py", "app/router/feed.py"] {
        let decision = decide(RULES, &write_payload(path, "x = 1\n"));
        assert!(decision.suggestions.is_empty(), "{}", path);
    }
}

#[test]
fn test_windows_separators_are_normalized() {
    let decision = decide(RULES, &write_payload("app\\api\\users.py", "x = 1\n"));
    assert_eq!(rule_names(&decision.suggestions), vec!["backend-dev-guidelines"]);
}

#[test]
fn test_absolute_path_matches_relative_glob_via_cwd() {
    let rules = r#"{"skills": [{"name": "rust-src", "type": "suggest", "filePaths": ["src/**/*.rs"]}]}"#;
    let payload = r#"{
        "hook_event_name": "PostToolUse",
        "cwd": "/work/proj",
        "tool_name": "Write",
        "tool_input": {"file_path": "/work/proj/src/engine/mod.rs", "content": "fn main() {}"}
    }"#;
    assert_eq!(rule_names(&decide(rules, payload).suggestions), vec!["rust-src"]);

    let outside = payload.replace("\"/work/proj\"", "\"/elsewhere\"");
    assert!(decide(rules, &outside).suggestions.is_empty());
}

// ============================================================================
// Content analysis
// ============================================================================

#[test]
fn test_async_without_await_raises_warning() {
    let decision = decide(RULES, &write_payload("app/routes/feed.py", ASYNC_NO_AWAIT));

    assert_eq!(rule_names(&decision.warnings), vec!["async-hygiene"]);
    assert_eq!(rule_names(&decision.suggestions), vec!["route-conventions"]);
    assert!(!decision.is_blocked());

    let json = HookOutput::from_decision(&decision, "PostToolUse").to_json();
    assert!(json.contains("[skills:async-hygiene] Warning: An async function never awaits"));
}

#[test]
fn test_awaiting_function_is_quiet() {
    let content = "async def refresh(feed_id: int) -> None:\n    await save(feed_id)\n";
    let decision = decide(RULES, &write_payload("lib/feed.py", content));
    assert!(decision.is_empty());
}

#[test]
fn test_dependency_manifest_edit() {
    let decision = decide(RULES, &write_payload("requirements.txt", "fastapi==0.110.0\n"));
    assert_eq!(rule_names(&decision.warnings), vec!["dependency-audit"]);
    assert_eq!(
        decision.warnings[0].message,
        "Dependencies changed: run a vulnerability audit"
    );
}

#[test]
fn test_warnings_ordered_by_priority() {
    let content = "async def main():\n    pass\n";
    let decision = decide(RULES, &write_payload("setup.py", content));
    assert_eq!(
        rule_names(&decision.warnings),
        vec!["dependency-audit", "async-hygiene"]
    );
}

#[test]
fn test_edit_new_string_is_analyzed() {
    let payload = format!(
        r#"{{"tool_name":"Edit","tool_input":{{"file_path":"app/settings.py","old_string":"x","new_string":{}}}}}"#,
        escape("API_KEY = \"sk_live_abc123def456789012345\"")
    );
    let decision = decide(RULES, &payload);
    assert_eq!(decision.block.as_ref().map(|b| b.rule.as_str()), Some("no-committed-secrets"));
}

#[test]
fn test_missing_content_only_evaluates_paths() {
    let decision = decide(RULES, &multi_edit_payload("app/api/users.py"));
    assert_eq!(rule_names(&decision.suggestions), vec!["backend-dev-guidelines"]);
    assert!(decision.warnings.is_empty());
    assert!(decision.block.is_none());
}

#[test]
fn test_secret_in_content_blocks() {
    let decision = decide(
        RULES,
        &write_payload("app/config.py", "password = \"hunter2\"\n"),
    );

    assert!(decision.is_blocked());
    assert_eq!(
        decision.blocking_message(),
        Some("Credentials must not be committed (no-committed-secrets)")
    );

    let json = HookOutput::from_decision(&decision, "PostToolUse").to_json();
    assert!(json.contains(r#""decision":"block""#));
    assert!(json.contains("[no-committed-secrets] Credentials must not be committed"));
}

#[test]
fn test_disabled_analyzer_produces_no_structural_matches() {
    let config: skill_activator::Config = toml::from_str("[analyzer]\nenabled = false\n").unwrap();
    let engine = ActivationEngine::with_analyzer(
        RuleStore::parse(RULES).unwrap().rules,
        skill_activator::ContentAnalyzer::new(&config.analyzer),
    );
    let event = HookEvent::from_json(&write_payload("requirements.txt", "x\n")).unwrap();
    assert!(engine.evaluate_event(&event, EnvSnapshot::empty()).is_empty());
}

// ============================================================================
// Disk snapshots
// ============================================================================

#[test]
fn test_snapshot_read_from_disk() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("feed.py");
    std::fs::write(&file, ASYNC_NO_AWAIT).unwrap();

    let path = file.to_string_lossy().replace('\\', "/");
    let mut event = HookEvent::from_json(&multi_edit_payload(&path)).unwrap();
    if let HookEvent::FileEdit(edit) = &mut event {
        assert!(edit.content.is_none());
        edit.content = context::read_snapshot(&file);
        assert_eq!(edit.content.as_deref(), Some(ASYNC_NO_AWAIT));
    }

    let decision = engine_for(RULES).evaluate_event(&event, EnvSnapshot::empty());
    assert_eq!(rule_names(&decision.warnings), vec!["async-hygiene"]);
}

#[test]
fn test_missing_snapshot_is_none() {
    let dir = TempDir::new().unwrap();
    assert!(context::read_snapshot(&dir.path().join("gone.py")).is_none());
}
