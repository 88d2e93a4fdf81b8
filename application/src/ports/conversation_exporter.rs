//! Conversation export port

use chrono::{DateTime, Local};
use dbchat_domain::ConversationLog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Errors from exporting or reading back a conversation
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed export at line {line}: {message}")]
    Malformed { line: usize, message: String },
}

/// File format of an export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Text,
    Markdown,
    Jsonl,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Text => "txt",
            ExportFormat::Markdown => "md",
            ExportFormat::Jsonl => "jsonl",
        }
    }

    /// Format implied by a file extension, if recognized
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "log" => Some(ExportFormat::Text),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            "jsonl" | "ndjson" => Some(ExportFormat::Jsonl),
            _ => None,
        }
    }

    /// `chat_export_<YYYYmmdd_HHMMSS>.<ext>`
    pub fn default_file_name(&self, now: DateTime<Local>) -> String {
        format!(
            "chat_export_{}.{}",
            now.format("%Y%m%d_%H%M%S"),
            self.extension()
        )
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(ExportFormat::Text),
            "markdown" | "md" => Ok(ExportFormat::Markdown),
            "jsonl" | "json" => Ok(ExportFormat::Jsonl),
            other => Err(format!("Unknown export format: {}", other)),
        }
    }
}

/// Writes a conversation log to a file
pub trait ConversationExporter: Send + Sync {
    /// Serialize the full ordered log to `path`
    fn export(
        &self,
        log: &ConversationLog,
        path: &Path,
        format: ExportFormat,
    ) -> Result<(), ExportError>;
}
