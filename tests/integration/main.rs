//! Integration tests for skill-activator

mod cli_tests;
mod override_tests;
mod post_edit_tests;

use skill_activator::{ActivationEngine, Decision, EnvSnapshot, HookEvent, RuleStore};

/// Rule set shared by most scenarios
pub const RULES: &str = r#"{
    "version": "1.0",
    "description": "Skill activation rules",
    "skills": [
        {
            "name": "backend-dev-guidelines",
            "type": "suggest",
            "priority": "high",
            "description": "FastAPI backend patterns",
            "keywords": ["fastapi", "endpoint"],
            "filePaths": ["**/api/**/*.py"],
            "message": "Consider using the `/{name}` skill: {description}"
        },
        {
            "name": "route-conventions",
            "type": "suggest",
            "priority": "low",
            "filePaths": ["**/routes/**/*.py"]
        },
        {
            "name": "webhook-security",
            "type": "suggest",
            "priority": "critical",
            "keywords": ["hmac", "replay attack"],
            "intentPatterns": ["(verify|validate|check).*?(signature|webhook|hmac)"]
        },
        {
            "name": "async-hygiene",
            "type": "warn",
            "priority": "medium",
            "keywords": ["async-without-await"],
            "message": "An async function never awaits; make it synchronous or await its I/O"
        },
        {
            "name": "dependency-audit",
            "type": "warn",
            "priority": "high",
            "keywords": ["dependency-change"],
            "message": "Dependencies changed: run a vulnerability audit"
        },
        {
            "name": "no-committed-secrets",
            "type": "block",
            "priority": "critical",
            "keywords": ["hardcoded-secret"],
            "blockMessage": "Credentials must not be committed ({name})",
            "skipMarkers": ["@allow-secret"],
            "skipEnvVar": "SKIP_SECRET_CHECK"
        }
    ],
    "globalSettings": {
        "enableSkillSuggestions": true,
        "maxSuggestionsPerPrompt": 3,
        "priorityOrder": ["critical", "high", "medium", "low"]
    }
}"#;

pub fn engine_for(rules: &str) -> ActivationEngine {
    ActivationEngine::new(RuleStore::parse(rules).unwrap().rules)
}

pub fn decide_with_env(rules: &str, payload: &str, env: EnvSnapshot) -> Decision {
    let event = HookEvent::from_json(payload).unwrap();
    engine_for(rules).evaluate_event(&event, env)
}

pub fn decide(rules: &str, payload: &str) -> Decision {
    decide_with_env(rules, payload, EnvSnapshot::empty())
}

/// JSON-escape a string for embedding in a payload
pub fn escape(s: &str) -> String {
    serde_json::to_string(s).unwrap()
}

pub fn prompt_payload(prompt: &str) -> String {
    format!(
        r#"{{"hook_event_name":"UserPromptSubmit","session_id":"s1","prompt":{}}}"#,
        escape(prompt)
    )
}

pub fn write_payload(file_path: &str, content: &str) -> String {
    format!(
        r#"{{"hook_event_name":"PostToolUse","tool_name":"Write","tool_input":{{"file_path":{},"content":{}}}}}"#,
        escape(file_path),
        escape(content)
    )
}

pub fn rule_names(activations: &[skill_activator::Activation]) -> Vec<&str> {
    activations.iter().map(|a| a.rule.as_str()).collect()
}
