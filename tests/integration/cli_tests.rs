//! Integration tests driving the hook binary through stdin and stdout

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use serde_json::json;
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_skill-activator");

const PROJECT_RULES: &str = r#"{"skills": [
    {"name": "no-deploys", "type": "block", "priority": "critical", "keywords": ["deploy"],
     "blockMessage": "Deploys are frozen", "skipEnvVar": "SKIP_CHECK"},
    {"name": "feed-routes", "type": "suggest", "filePaths": ["app/routes/**/*.py"]},
    {"name": "async-hygiene", "type": "warn", "keywords": ["async-without-await"],
     "message": "An async function never awaits"}
]}"#;

const ASYNC_NO_AWAIT: &str = "async def refresh(feed_id: int) -> None:\n    save(feed_id)\n";

/// A project directory holding the default rule file
fn project() -> TempDir {
    let dir = TempDir::new().unwrap();
    let skills = dir.path().join(".claude/skills");
    std::fs::create_dir_all(&skills).unwrap();
    std::fs::write(skills.join("skill-rules.json"), PROJECT_RULES).unwrap();
    dir
}

/// Run the binary with `HOME` pointed at the project so no user config is read
fn run_in(project: &Path, project_env: bool, args: &[&str], env: &[(&str, &str)], stdin: &str) -> String {
    let mut command = Command::new(BIN);
    command
        .args(args)
        .env("HOME", project)
        .env_remove("SKIP_CHECK")
        .env_remove("SKILL_ACTIVATOR_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    if project_env {
        command.env("CLAUDE_PROJECT_DIR", project);
    } else {
        command.env_remove("CLAUDE_PROJECT_DIR");
    }
    for (name, value) in env {
        command.env(name, value);
    }

    let mut child = command.spawn().unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success(), "exit status {:?}", output.status);
    String::from_utf8(output.stdout).unwrap()
}

fn run(project: &Path, args: &[&str], env: &[(&str, &str)], stdin: &str) -> String {
    run_in(project, true, args, env, stdin)
}

// ============================================================================
// Degraded inputs still answer with an empty decision
// ============================================================================

#[test]
fn test_garbage_payload_prints_empty_object() {
    let dir = project();
    assert_eq!(run(dir.path(), &[], &[], "garbage"), "{}\n");
}

#[test]
fn test_empty_stdin_prints_empty_object() {
    let dir = project();
    assert_eq!(run(dir.path(), &[], &[], ""), "{}\n");
}

#[test]
fn test_unexpected_payload_shape_prints_empty_object() {
    let dir = project();
    assert_eq!(run(dir.path(), &[], &[], r#"{"tool_name":"Bash"}"#), "{}\n");
}

#[test]
fn test_missing_rule_file_prints_empty_object() {
    let dir = project();
    let stdout = run(
        dir.path(),
        &["--rules", "/nonexistent/skill-rules.json"],
        &[],
        r#"{"prompt":"deploy"}"#,
    );
    assert_eq!(stdout, "{}\n");
}

// ============================================================================
// Blocks and overrides
// ============================================================================

#[test]
fn test_block_reaches_stdout() {
    let dir = project();
    let stdout = run(dir.path(), &[], &[], r#"{"prompt":"deploy"}"#);
    assert!(stdout.contains(r#""decision":"block""#));
    assert!(stdout.contains("[no-deploys] Deploys are frozen"));
}

#[test]
fn test_skip_env_var_from_process_environment() {
    let dir = project();
    assert_eq!(
        run(dir.path(), &[], &[("SKIP_CHECK", "1")], r#"{"prompt":"deploy"}"#),
        "{}\n"
    );

    let stdout = run(
        dir.path(),
        &["--format", "text"],
        &[("SKIP_CHECK", "0")],
        r#"{"prompt":"deploy"}"#,
    );
    assert_eq!(stdout, "BLOCK [no-deploys] Deploys are frozen\n");
}

#[test]
fn test_dry_run_reports_block_as_warning() {
    let dir = project();
    let stdout = run(dir.path(), &["--dry-run", "--format=text"], &[], r#"{"prompt":"deploy"}"#);
    assert_eq!(stdout, "WARN [no-deploys] Deploys are frozen\n");
}

#[test]
fn test_text_format_with_nothing_matched_is_empty() {
    let dir = project();
    assert_eq!(run(dir.path(), &["-f", "text"], &[], r#"{"prompt":"hello"}"#), "");
}

// ============================================================================
// Project resolution and disk snapshots
// ============================================================================

#[test]
fn test_rule_file_found_through_payload_cwd() {
    let dir = project();
    let payload = json!({"prompt": "deploy", "cwd": dir.path()}).to_string();
    let stdout = run_in(dir.path(), false, &[], &[], &payload);
    assert!(stdout.contains(r#""decision":"block""#));
}

#[test]
fn test_snapshot_read_from_project_directory() {
    let dir = project();
    let routes = dir.path().join("app/routes");
    std::fs::create_dir_all(&routes).unwrap();
    std::fs::write(routes.join("feed.py"), ASYNC_NO_AWAIT).unwrap();

    let payload = json!({
        "hook_event_name": "PostToolUse",
        "tool_name": "MultiEdit",
        "tool_input": {"file_path": "app/routes/feed.py", "edits": []}
    })
    .to_string();
    let stdout = run(dir.path(), &["--format", "text"], &[], &payload);
    assert_eq!(
        stdout,
        "WARN [async-hygiene] An async function never awaits\nSUGGEST [feed-routes] feed-routes\n"
    );
}

#[test]
fn test_globs_are_relative_to_project_not_session_cwd() {
    let dir = project();
    let file = dir.path().join("app/routes/feed.py");
    let payload = json!({
        "tool_name": "Write",
        "cwd": dir.path().join("app"),
        "tool_input": {"file_path": file, "content": "x = 1\n"}
    })
    .to_string();
    let stdout = run(dir.path(), &["--format", "text"], &[], &payload);
    assert_eq!(stdout, "SUGGEST [feed-routes] feed-routes\n");
}
