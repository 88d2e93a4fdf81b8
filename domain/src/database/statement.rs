//! Statement extraction and read-only classification

use crate::core::error::DomainError;
use regex::Regex;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_-]*[ \t]*\r?\n(.*?)```").expect("valid fenced block regex")
});

static STRING_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'(?:[^']|'')*'").expect("valid literal regex"));

static WRITE_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(insert|update|delete|drop|alter|create|truncate|merge|grant|revoke|attach|detach|vacuum|reindex|rename|upsert|call|lock|into)\b",
    )
    .expect("valid keyword regex")
});

const READ_VERBS: &[&str] = &[
    "select", "with", "explain", "pragma", "show", "describe", "desc", "values", "table",
];

/// Pragmas that only report, with or without a table argument
const PRAGMAS_WITH_ARGUMENT: &[&str] = &[
    "table_info",
    "table_xinfo",
    "index_list",
    "index_info",
    "index_xinfo",
    "foreign_key_list",
];

/// Pragmas that only report when called bare; `user_version(42)` sets the value
const PRAGMAS_BARE: &[&str] = &[
    "table_list",
    "database_list",
    "user_version",
    "schema_version",
    "application_id",
    "data_version",
    "page_count",
    "page_size",
    "freelist_count",
    "encoding",
    "compile_options",
    "collation_list",
    "function_list",
];

/// Effect of a statement on the database
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Read,
    Write,
}

/// Pull the statement out of a model reply.
///
/// Prefers the first fenced code block; otherwise the whole reply. A trailing
/// semicolon is dropped. Returns `None` when nothing usable remains.
pub fn extract_statement(reply: &str) -> Option<String> {
    let body = FENCED_BLOCK
        .captures(reply)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(reply);

    let statement = body.trim().trim_end_matches(';').trim();
    if statement.is_empty() {
        None
    } else {
        Some(statement.to_string())
    }
}

/// Classify a statement as read-only or writing.
///
/// String literals are ignored, so `SELECT 'drop table'` stays a read.
pub fn classify_statement(statement: &str) -> StatementKind {
    let stripped = STRING_LITERAL.replace_all(statement, "''");
    let first = stripped
        .split_whitespace()
        .next()
        .unwrap_or_default()
        .trim_start_matches('(')
        .to_ascii_lowercase();

    if !READ_VERBS.contains(&first.as_str()) {
        return StatementKind::Write;
    }
    if first == "pragma" && !is_read_pragma(&stripped) {
        return StatementKind::Write;
    }
    if WRITE_KEYWORD.is_match(&stripped) {
        return StatementKind::Write;
    }
    StatementKind::Read
}

/// Only allowlisted pragmas are reads; anything unknown may change state
fn is_read_pragma(statement: &str) -> bool {
    let body = statement
        .trim_start()
        .trim_start_matches('(')
        .get("pragma".len()..)
        .unwrap_or_default()
        .trim();
    if body.contains('=') {
        return false;
    }
    let (name, call) = match body.find('(') {
        Some(i) => (body[..i].trim(), true),
        None => (body, false),
    };
    let name = name.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    if PRAGMAS_WITH_ARGUMENT.contains(&name.as_str()) {
        return true;
    }
    !call && PRAGMAS_BARE.contains(&name.as_str())
}

/// Reject anything the read-only sandbox does not allow.
///
/// Multiple statements are rejected as well, since only the first one would
/// be checked otherwise.
pub fn ensure_read_only(statement: &str) -> Result<(), DomainError> {
    let stripped = STRING_LITERAL.replace_all(statement, "''");
    let parts = stripped
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .count();
    if parts > 1 {
        return Err(DomainError::SandboxViolation(
            "multiple statements are not allowed".to_string(),
        ));
    }
    match classify_statement(statement) {
        StatementKind::Read => Ok(()),
        StatementKind::Write => Err(DomainError::SandboxViolation(statement.to_string())),
    }
}
