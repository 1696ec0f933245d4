//! Credential detection
//!
//! Shared by the `hardcoded-secret` check and by audit redaction.

use once_cell::sync::Lazy;
use regex::Regex;

/// Common secret patterns to detect in any context
pub static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        // API keys and tokens
        r#"(?i)api[_-]?key\s*[=:]\s*['"]?[a-zA-Z0-9_]{16,}"#,
        r#"(?i)secret[_-]?key\s*[=:]\s*['"]?[a-zA-Z0-9_]{16,}"#,
        r#"(?i)access[_-]?token\s*[=:]\s*['"]?[a-zA-Z0-9_]{16,}"#,
        // AWS
        r"AKIA[0-9A-Z]{16}",
        r#"(?i)aws[_-]?secret[_-]?access[_-]?key\s*[=:]\s*['"]?[0-9a-zA-Z/+]{20,}"#,
        // GitHub tokens
        r"gh[pousr]_[A-Za-z0-9_]{36,}",
        r"github_pat_[A-Za-z0-9_]{22,}",
        // Private key blocks
        r"-----BEGIN (RSA |EC |OPENSSH )?PRIVATE KEY-----",
        // Quoted password assignments
        r#"(?i)(password|passwd|pwd)\s*[=:]\s*['"][^'"]+['"]"#,
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Check if text contains potential secrets
pub fn contains_secret(text: &str) -> bool {
    SECRET_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Redact secrets in text for logging
pub fn redact_secrets(text: &str) -> String {
    let mut redacted = text.to_string();

    for pattern in SECRET_PATTERNS.iter() {
        redacted = pattern.replace_all(&redacted, "[REDACTED]").to_string();
    }

    redacted
}
