//! skill-activator - Contextual skill activation for Claude Code hooks
//!
//! Reads one hook payload from stdin, evaluates the project's skill rules and
//! writes the decision to stdout. Always exits successfully; diagnostics go to
//! stderr.
//!
//! # Usage
//!
//! ```bash
//! # As a UserPromptSubmit / PostToolUse hook
//! echo '{"prompt":"add a FastAPI endpoint"}' | skill-activator
//!
//! # Plain-text output against an explicit rule file
//! skill-activator --rules .claude/skills/skill-rules.json --format text
//!
//! # Report blocks without enforcing them
//! skill-activator --dry-run
//! ```

use std::env;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use skill_activator::{
    audit::AuditLogger,
    config::Config,
    context,
    engine::ActivationEngine,
    input::HookEvent,
    logging,
    output::{Decision, HookOutput},
    rules::RuleStore,
    ContentAnalyzer,
};

/// Print version information
fn print_version() {
    println!("skill-activator {}", env!("CARGO_PKG_VERSION"));
}

/// Print help message
fn print_help() {
    println!(
        r#"skill-activator - Contextual skill activation for Claude Code hooks

USAGE:
    skill-activator [OPTIONS]

OPTIONS:
    -h, --help              Print this help message
    -v, --version           Print version information
    -r, --rules PATH        Path to the skill rules file
                            (default: .claude/skills/skill-rules.json in the project)
    -c, --config PATH       Path to config file
    -f, --format FORMAT     Output format: json (hook protocol) or text
    -d, --dry-run           Report blocks as warnings instead of enforcing them

ENVIRONMENT:
    CLAUDE_PROJECT_DIR      Project directory used to resolve the rules file
    SKILL_ACTIVATOR_LOG     Diagnostic filter for stderr (default: warn)

USAGE AS HOOK:
    Configure in .claude/settings.json:
    {{
      "hooks": {{
        "UserPromptSubmit": [{{
          "hooks": [{{ "type": "command", "command": "skill-activator" }}]
        }}],
        "PostToolUse": [{{
          "matcher": "Edit|MultiEdit|Write",
          "hooks": [{{ "type": "command", "command": "skill-activator" }}]
        }}]
      }}
    }}
"#
    );
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Text,
}

impl Format {
    fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(Format::Json),
            "text" => Some(Format::Text),
            _ => None,
        }
    }
}

/// Parse command line arguments
struct Args {
    help: bool,
    version: bool,
    dry_run: bool,
    format: Format,
    rules_path: Option<String>,
    config_path: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut result = Args {
            help: false,
            version: false,
            dry_run: false,
            format: Format::Json,
            rules_path: None,
            config_path: None,
        };

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "-h" | "--help" => result.help = true,
                "-v" | "--version" => result.version = true,
                "-d" | "--dry-run" => result.dry_run = true,
                "-f" | "--format" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.format = Format::from_str(&args[i]).unwrap_or(result.format);
                    }
                }
                "-r" | "--rules" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.rules_path = Some(args[i].clone());
                    }
                }
                "-c" | "--config" => {
                    if i + 1 < args.len() {
                        i += 1;
                        result.config_path = Some(args[i].clone());
                    }
                }
                arg if arg.starts_with("--format=") => {
                    let format = arg.trim_start_matches("--format=");
                    result.format = Format::from_str(format).unwrap_or(result.format);
                }
                arg if arg.starts_with("--rules=") => {
                    result.rules_path = Some(arg.trim_start_matches("--rules=").to_string());
                }
                arg if arg.starts_with("--config=") => {
                    result.config_path = Some(arg.trim_start_matches("--config=").to_string());
                }
                other => warn!(argument = other, "ignoring unknown argument"),
            }
            i += 1;
        }

        result
    }
}

/// Directory the rule file and relative edit paths are resolved against
fn project_dir(event: &HookEvent) -> Option<PathBuf> {
    env::var_os("CLAUDE_PROJECT_DIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| event.envelope().cwd.as_ref().map(PathBuf::from))
}

/// Read the post-edit snapshot from disk when the payload did not carry it
fn attach_snapshot(event: &mut HookEvent, project: Option<&Path>) {
    if let HookEvent::FileEdit(edit) = event {
        if edit.content.is_some() {
            return;
        }
        let path = Path::new(edit.file_path());
        let full = match project {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        edit.content = context::read_snapshot(&full);
    }
}

fn write_output(decision: &Decision, event_name: &str, format: Format) {
    let rendered = match format {
        Format::Json => HookOutput::from_decision(decision, event_name).to_json(),
        Format::Text => decision.render_text(),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if !rendered.is_empty() {
        let _ = writeln!(handle, "{}", rendered);
    }
    let _ = handle.flush();
}

fn main() {
    logging::init_tracing();

    let args = Args::parse();

    // Handle help and version
    if args.help {
        print_help();
        return;
    }

    if args.version {
        print_version();
        return;
    }

    // Load configuration
    let config = if let Some(ref path) = args.config_path {
        Config::load_from(Path::new(path)).unwrap_or_else(|e| {
            warn!(path = %path, error = %e, "failed to load config, using defaults");
            Config::default()
        })
    } else {
        Config::load()
    };

    // Read JSON from stdin
    let mut input_json = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut input_json) {
        warn!(error = %e, "failed to read stdin");
    }

    // No input = nothing to evaluate
    if input_json.trim().is_empty() {
        write_output(&Decision::empty(), "UserPromptSubmit", args.format);
        return;
    }

    let mut event = match HookEvent::from_json(&input_json) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "invalid hook payload, no rules evaluated");
            write_output(&Decision::empty(), "UserPromptSubmit", args.format);
            return;
        }
    };

    let project = project_dir(&event);
    attach_snapshot(&mut event, project.as_deref());

    // Rules are re-read on every invocation
    let rules_path = match &args.rules_path {
        Some(path) => Config::expand_path(path),
        None => config.rules_path(project.as_deref()),
    };
    let loaded = RuleStore::load(&rules_path);

    let engine = ActivationEngine::with_analyzer(loaded.rules, ContentAnalyzer::new(&config.analyzer));
    let env_snapshot = engine.capture_env();

    let root = project.as_deref().and_then(Path::to_str);
    let mut decision = engine.evaluate_event_in(&event, env_snapshot, root);
    if args.dry_run {
        decision = decision.demote_block();
    }

    if config.general.audit_log {
        let mut logger = AuditLogger::new(config.audit_path().as_deref());
        if let Err(e) = logger.log_decision(&event, &decision) {
            warn!(error = %e, "failed to write audit log");
        }
    }

    write_output(&decision, event.event_name(), args.format);
}
