//! Routing policy for free-text input

use crate::database::uri::{ConnectionUri, find_connection_uri};
use crate::session::entities::SessionContext;

/// What a free-text line is asking for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Connect(ConnectionUri),
    Query,
    Analyze,
    Conversation,
}

impl Intent {
    /// Parse a one-word classification label (`query`, `analyze`,
    /// `conversation`). Connect is never accepted from a label since it needs
    /// a URI found in the text itself.
    pub fn from_label(label: &str) -> Option<Intent> {
        let word = label
            .trim()
            .trim_matches(|c: char| !c.is_ascii_alphanumeric())
            .to_ascii_lowercase();
        match word.as_str() {
            "query" | "question" | "data" => Some(Intent::Query),
            "analyze" | "analysis" | "analytics" | "chart" => Some(Intent::Analyze),
            "conversation" | "chat" | "casual" | "smalltalk" => Some(Intent::Conversation),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Intent::Connect(_) => "connect",
            Intent::Query => "query",
            Intent::Analyze => "analyze",
            Intent::Conversation => "conversation",
        }
    }
}

const ANALYSIS_TERMS: &[&str] = &[
    "chart",
    "plot",
    "graph",
    "visualize",
    "visualise",
    "visualization",
    "dashboard",
    "distribution",
    "histogram",
    "breakdown",
    "trend",
    "correlation",
    "correlate",
];

const QUERY_PHRASES: &[&str] = &["how many", "how much", "what is the", "what are the", "which"];

const QUERY_TERMS: &[&str] = &[
    "count", "list", "show", "select", "find", "average", "avg", "sum", "total", "max",
    "maximum", "min", "minimum", "top", "latest", "oldest", "newest", "rows", "records",
    "entries", "table", "tables", "column", "columns", "where", "group", "order",
];

/// Keyword-based intent classifier.
///
/// Deterministic and offline; used directly or as the fallback of the
/// model-backed classifier.
#[derive(Debug, Clone, Default)]
pub struct HeuristicIntentClassifier;

impl HeuristicIntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str, session: &SessionContext) -> Intent {
        if let Some(uri) = find_connection_uri(text) {
            return Intent::Connect(uri);
        }
        if !session.connected {
            return Intent::Conversation;
        }

        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric() && c != '_')
            .filter(|w| !w.is_empty())
            .collect();

        if words.iter().any(|w| ANALYSIS_TERMS.contains(w)) {
            return Intent::Analyze;
        }
        if QUERY_PHRASES.iter().any(|p| lower.contains(p))
            || words.iter().any(|w| QUERY_TERMS.contains(w))
            || words
                .iter()
                .any(|w| session.tables.iter().any(|t| t.eq_ignore_ascii_case(w)))
        {
            return Intent::Query;
        }
        Intent::Conversation
    }
}
