//! Structural content checks
//!
//! Each check is a pure function from the edited file to a set of synthetic
//! keywords. Python gets line/indentation based function analysis; other
//! languages get file-level heuristics.

use std::collections::BTreeSet;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::secrets;
use super::AnalysisInput;
use crate::error::AnalyzerCheckError;

pub const ASYNC_WITHOUT_AWAIT: &str = "async-without-await";
pub const MISSING_TYPE_HINT: &str = "missing-type-hint";
pub const MISSING_TEST_REFERENCE: &str = "missing-test-reference";
pub const DEPENDENCY_CHANGE: &str = "dependency-change";
pub const HIGH_COMPLEXITY: &str = "high-complexity";
pub const HARDCODED_SECRET: &str = "hardcoded-secret";

static DEF_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?P<async>async\s+)?def\s+(?P<name>[A-Za-z_]\w*)\s*\(")
        .expect("static regex")
});

static ASYNC_DECL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\basync\s+(def|fn|function)\b|\basync\s*\(|\basync\s+\w+\s*=>").expect("static regex")
});

static SUSPENSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bawait\b|\.await\b|\basync\s+(for|with)\b").expect("static regex"));

static BRANCH_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(if|elif|for|while|except|and|or|case)\b").expect("static regex")
});

static STRING_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""[^"\n]*"|'[^'\n]*'"#).expect("static regex"));

static PUBLIC_ENTRY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?m)^(async\s+)?def\s+[A-Za-z]\w*\s*\(",
        r"|^\s*pub\s+(async\s+)?fn\s+\w+",
        r"|^\s*export\s+(default\s+)?(async\s+)?function\b",
        r"|^\s*export\s+const\s+\w+\s*=\s*(async\s*)?\(",
        r"|^func\s+(\([^)]*\)\s*)?[A-Z]\w*\s*\(",
    ))
    .expect("static regex")
});

static TEST_REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\btest|_test").expect("static regex"));

static TEST_FILE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(test_.*|.*_test\.\w+|.*\.(test|spec)\.\w+|tests?\.\w+|conftest\.py)$").expect("static regex")
});

static DEPENDENCY_MANIFEST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(requirements.*\.(txt|in)|pyproject\.toml|Pipfile(\.lock)?|poetry\.lock|setup\.(py|cfg)",
        r"|package(-lock)?\.json|yarn\.lock|pnpm-lock\.yaml",
        r"|Cargo\.(toml|lock)|go\.(mod|sum)|Gemfile(\.lock)?|pom\.xml|build\.gradle(\.kts)?)$",
    ))
    .expect("static regex")
});

/// A Python function located by indentation
#[derive(Debug)]
struct PyFunction<'a> {
    name: &'a str,
    is_async: bool,
    /// Text from `def` up to (not including) the signature's closing `:`
    signature: String,
    /// Code lines of the body, including an inline body after the colon
    body: Vec<String>,
}

fn file_name(path: Option<&str>) -> Option<&str> {
    path.and_then(|p| Path::new(p).file_name()).and_then(|n| n.to_str())
}

fn is_python(input: &AnalysisInput<'_>) -> bool {
    match input.path {
        Some(path) => path.ends_with(".py") || path.ends_with(".pyi"),
        None => input.content.lines().any(|l| DEF_LINE.is_match(l)),
    }
}

fn is_test_file(path: Option<&str>) -> bool {
    let Some(path) = path else {
        return false;
    };
    let in_test_dir = path
        .split('/')
        .any(|segment| matches!(segment, "test" | "tests" | "__tests__" | "spec"));
    in_test_dir || file_name(Some(path)).is_some_and(|name| TEST_FILE_NAME.is_match(name))
}

/// Remove a trailing `#` comment, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut quote: Option<char> = None;
    for (idx, ch) in line.char_indices() {
        match (quote, ch) {
            (None, '#') => return &line[..idx],
            (None, '"') | (None, '\'') => quote = Some(ch),
            (Some(q), c) if c == q => quote = None,
            _ => {}
        }
    }
    line
}

fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 8 } else { 1 })
        .sum()
}

/// Code content of lines: comments, string literals and docstrings removed
fn code_lines<'a>(lines: impl IntoIterator<Item = &'a String>) -> Vec<String> {
    let mut in_docstring = false;
    let mut code = Vec::new();
    for line in lines {
        let quotes = line.matches("\"\"\"").count() + line.matches("'''").count();
        if in_docstring || quotes > 0 {
            if quotes % 2 == 1 {
                in_docstring = !in_docstring;
            }
            continue;
        }
        let stripped = STRING_LITERAL.replace_all(strip_comment(line), "");
        code.push(stripped.into_owned());
    }
    code
}

/// Locate Python functions by indentation.
///
/// Fails only when a function body mixes tab and space indentation, since its
/// extent cannot be determined reliably.
fn python_functions(content: &str) -> Result<Vec<PyFunction<'_>>, String> {
    let lines: Vec<&str> = content.lines().collect();
    let mut functions = Vec::new();

    for (start, &line) in lines.iter().enumerate() {
        let Some(caps) = DEF_LINE.captures(line) else {
            continue;
        };
        let name = caps.name("name").map_or("", |m| m.as_str());
        let def_indent = indent_width(line);

        // Find the signature's closing colon at bracket depth zero
        let mut signature = String::new();
        let mut depth = 0i32;
        let mut opened = false;
        let mut end: Option<(usize, String)> = None;
        'scan: for (offset, raw) in lines[start..].iter().enumerate() {
            let text = strip_comment(raw);
            for (idx, ch) in text.char_indices() {
                match ch {
                    '(' | '[' | '{' => {
                        depth += 1;
                        opened = true;
                    }
                    ')' | ']' | '}' => depth -= 1,
                    ':' if opened && depth == 0 => {
                        signature.push_str(&text[..idx]);
                        end = Some((start + offset, text[idx + 1..].trim().to_string()));
                        break 'scan;
                    }
                    _ => {}
                }
            }
            signature.push_str(text);
            signature.push('\n');
        }

        // Incomplete signature (file mid-edit): nothing to analyze
        let Some((sig_end, inline_body)) = end else {
            continue;
        };

        let mut body: Vec<String> = Vec::new();
        if !inline_body.is_empty() {
            body.push(inline_body);
        }

        let mut saw_tabs = false;
        let mut saw_spaces = false;
        for raw in &lines[sig_end + 1..] {
            if raw.trim().is_empty() {
                continue;
            }
            if indent_width(raw) <= def_indent {
                break;
            }
            let leading: String = raw.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
            saw_tabs |= leading.contains('\t');
            saw_spaces |= leading.contains(' ');
            body.push((*raw).to_string());
        }

        if saw_tabs && saw_spaces {
            return Err(format!(
                "function `{}` at line {} mixes tab and space indentation",
                name,
                start + 1
            ));
        }

        functions.push(PyFunction {
            name,
            is_async: caps.name("async").is_some(),
            signature,
            body,
        });
    }

    Ok(functions)
}

/// Split on commas at bracket depth zero
fn split_params(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut last = 0;
    for (idx, ch) in params.char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&params[last..idx]);
                last = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(&params[last..]);
    parts
}

fn lacks_annotations(function: &PyFunction<'_>) -> bool {
    let signature = function.signature.as_str();
    let Some(open) = signature.find('(') else {
        return false;
    };

    // Matching close paren of the parameter list
    let mut depth = 0i32;
    let mut close = None;
    for (idx, ch) in signature[open..].char_indices() {
        match ch {
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + idx);
                    break;
                }
            }
            _ => {}
        }
    }
    let Some(close) = close else {
        return false;
    };

    let untyped_param = split_params(&signature[open + 1..close])
        .into_iter()
        .map(str::trim)
        .filter(|p| !matches!(*p, "" | "self" | "cls" | "*" | "/"))
        .any(|p| {
            let declared = p.split('=').next().unwrap_or(p);
            !declared.contains(':')
        });

    let missing_return = function.name != "__init__" && !signature[close..].contains("->");

    untyped_param || missing_return
}

/// The balanced `{...}` block at the start of `text`, or all of it when unbalanced
fn braced_block(text: &str) -> &str {
    let mut depth = 0i32;
    for (idx, ch) in text.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return &text[..=idx];
                }
            }
            _ => {}
        }
    }
    text
}

/// Body of the async declaration starting at `start`: its braced block, or the
/// rest of the line for an expression-bodied arrow function
fn async_body(content: &str, start: usize) -> &str {
    let rest = &content[start..];
    let mut parens = 0i32;
    for (idx, ch) in rest.char_indices() {
        match ch {
            '(' => parens += 1,
            ')' => parens -= 1,
            '{' if parens == 0 => return braced_block(&rest[idx..]),
            '\n' | ';' if parens == 0 && rest[..idx].contains("=>") => return &rest[..idx],
            _ => {}
        }
    }
    rest
}

/// Async declarations with no suspension point.
///
/// Python functions are delimited by indentation, other languages by the
/// braces (or arrow expression) following each `async` declaration. A body
/// that nests another async function also sees the inner function's awaits.
pub fn async_without_await(input: &AnalysisInput<'_>) -> Result<BTreeSet<String>, AnalyzerCheckError> {
    let mut signals = BTreeSet::new();

    if is_python(input) {
        let functions = python_functions(input.content)
            .map_err(|reason| AnalyzerCheckError::new(ASYNC_WITHOUT_AWAIT, reason))?;
        let offending = functions
            .iter()
            .filter(|f| f.is_async)
            .any(|f| !code_lines(&f.body).iter().any(|l| SUSPENSION.is_match(l)));
        if offending {
            signals.insert(ASYNC_WITHOUT_AWAIT.to_string());
        }
    } else if ASYNC_DECL
        .find_iter(input.content)
        .any(|decl| !SUSPENSION.is_match(async_body(input.content, decl.start())))
    {
        signals.insert(ASYNC_WITHOUT_AWAIT.to_string());
    }

    Ok(signals)
}

/// Python functions missing parameter or return annotations
pub fn missing_type_hint(input: &AnalysisInput<'_>) -> Result<BTreeSet<String>, AnalyzerCheckError> {
    let mut signals = BTreeSet::new();
    if !is_python(input) {
        return Ok(signals);
    }

    let functions = python_functions(input.content)
        .map_err(|reason| AnalyzerCheckError::new(MISSING_TYPE_HINT, reason))?;
    if functions.iter().any(lacks_annotations) {
        signals.insert(MISSING_TYPE_HINT.to_string());
    }
    Ok(signals)
}

/// Public entry points in a non-test file that never mentions tests
pub fn missing_test_reference(
    input: &AnalysisInput<'_>,
) -> Result<BTreeSet<String>, AnalyzerCheckError> {
    let mut signals = BTreeSet::new();
    if is_test_file(input.path) {
        return Ok(signals);
    }
    if PUBLIC_ENTRY.is_match(input.content) && !TEST_REFERENCE.is_match(input.content) {
        signals.insert(MISSING_TEST_REFERENCE.to_string());
    }
    Ok(signals)
}

/// Dependency manifest or lock file edited
pub fn dependency_change(input: &AnalysisInput<'_>) -> Result<BTreeSet<String>, AnalyzerCheckError> {
    let mut signals = BTreeSet::new();
    if file_name(input.path).is_some_and(|name| DEPENDENCY_MANIFEST.is_match(name)) {
        signals.insert(DEPENDENCY_CHANGE.to_string());
    }
    Ok(signals)
}

/// Cyclomatic complexity of one function: 1 + branch points
fn complexity(function: &PyFunction<'_>) -> u32 {
    let branches: usize = code_lines(&function.body)
        .iter()
        .map(|line| BRANCH_TOKEN.find_iter(line).count())
        .sum();
    1 + branches as u32
}

/// Python functions above the configured complexity threshold
pub fn high_complexity(input: &AnalysisInput<'_>) -> Result<BTreeSet<String>, AnalyzerCheckError> {
    let mut signals = BTreeSet::new();
    if !is_python(input) {
        return Ok(signals);
    }

    let functions = python_functions(input.content)
        .map_err(|reason| AnalyzerCheckError::new(HIGH_COMPLEXITY, reason))?;
    if functions
        .iter()
        .any(|f| complexity(f) > input.complexity_threshold)
    {
        signals.insert(HIGH_COMPLEXITY.to_string());
    }
    Ok(signals)
}

/// Credential literals committed to source
pub fn hardcoded_secret(input: &AnalysisInput<'_>) -> Result<BTreeSet<String>, AnalyzerCheckError> {
    let mut signals = BTreeSet::new();
    if secrets::contains_secret(input.content) {
        signals.insert(HARDCODED_SECRET.to_string());
    }
    Ok(signals)
}
