//! Writes a [`ConversationLog`] as plain text, Markdown or JSONL.
//!
//! JSONL is the lossless format: [`read_jsonl`] rebuilds the exact log,
//! timestamps included.

use dbchat_application::ports::conversation_exporter::{
    ConversationExporter, ExportError, ExportFormat,
};
use dbchat_domain::{ConversationEntry, ConversationLog};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Exporter writing to the local filesystem.
///
/// Parent directories are created as needed; an existing file is replaced.
#[derive(Debug, Clone, Default)]
pub struct FileConversationExporter;

impl FileConversationExporter {
    pub fn new() -> Self {
        Self
    }
}

impl ConversationExporter for FileConversationExporter {
    fn export(
        &self,
        log: &ConversationLog,
        path: &Path,
        format: ExportFormat,
    ) -> Result<(), ExportError> {
        let write_error = |source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }

        let body = match format {
            ExportFormat::Text => render_text(log),
            ExportFormat::Markdown => render_markdown(log),
            ExportFormat::Jsonl => render_jsonl(log).map_err(|e| {
                write_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
            })?,
        };

        let mut writer = BufWriter::new(File::create(path).map_err(write_error)?);
        writer.write_all(body.as_bytes()).map_err(write_error)?;
        writer.flush().map_err(write_error)?;

        info!(
            "Exported {} entries to {} ({:?})",
            log.len(),
            path.display(),
            format
        );
        Ok(())
    }
}

/// `[YYYY-mm-dd HH:MM:SS] ROLE: content`, one block per entry
fn render_text(log: &ConversationLog) -> String {
    let mut out = String::new();
    for entry in log.entries() {
        let _ = writeln!(
            out,
            "[{}] {}: {}",
            entry.timestamp().format(TIMESTAMP_FORMAT),
            entry.role().as_str().to_ascii_uppercase(),
            entry.content()
        );
    }
    out
}

fn render_markdown(log: &ConversationLog) -> String {
    let mut out = String::from("# Conversation export\n");
    for entry in log.entries() {
        let _ = write!(
            out,
            "\n### {} ({})\n\n{}\n",
            entry.role().title(),
            entry.timestamp().format(TIMESTAMP_FORMAT),
            entry.content()
        );
    }
    out
}

fn render_jsonl(log: &ConversationLog) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for entry in log.entries() {
        out.push_str(&serde_json::to_string(entry)?);
        out.push('\n');
    }
    Ok(out)
}

/// Read a JSONL export back into a log. Blank lines are skipped.
pub fn read_jsonl(path: &Path) -> Result<ConversationLog, ExportError> {
    let read_error = |source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(read_error)?);

    let mut entries = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(read_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: ConversationEntry =
            serde_json::from_str(&line).map_err(|e| ExportError::Malformed {
                line: index + 1,
                message: e.to_string(),
            })?;
        entries.push(entry);
    }
    Ok(ConversationLog::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};
    use dbchat_domain::Role;

    fn sample_log() -> ConversationLog {
        let at = |s| Local.with_ymd_and_hms(2024, 3, 9, 14, 5, s).unwrap();
        ConversationLog::from_entries(vec![
            ConversationEntry::at(Role::User, "/connect sqlite:///shop.db", at(0)),
            ConversationEntry::at(Role::Assistant, "Connected to shop.db", at(1)),
            ConversationEntry::at(Role::User, "how many users?", at(2)),
            ConversationEntry::at(Role::Error, "no such table: users\nsecond line", at(3)),
        ])
    }

    #[test]
    fn test_text_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.txt");
        FileConversationExporter::new()
            .export(&sample_log(), &path, ExportFormat::Text)
            .unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "[2024-03-09 14:05:00] USER: /connect sqlite:///shop.db");
        assert_eq!(lines[1], "[2024-03-09 14:05:01] ASSISTANT: Connected to shop.db");
        assert_eq!(lines[3], "[2024-03-09 14:05:03] ERROR: no such table: users");
    }

    #[test]
    fn test_markdown_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chat.md");
        FileConversationExporter::new()
            .export(&sample_log(), &path, ExportFormat::Markdown)
            .unwrap();

        let md = std::fs::read_to_string(&path).unwrap();
        assert!(md.starts_with("# Conversation export\n"));
        assert!(md.contains("### You (2024-03-09 14:05:02)\n\nhow many users?\n"));
        assert_eq!(md.matches("### ").count(), 4);
    }

    #[test]
    fn test_jsonl_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/chat.jsonl");
        let log = sample_log();

        FileConversationExporter::new()
            .export(&log, &path, ExportFormat::Jsonl)
            .unwrap();
        let back = read_jsonl(&path).unwrap();

        assert_eq!(back, log);
    }

    #[test]
    fn test_empty_log_exports_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        FileConversationExporter::new()
            .export(&ConversationLog::new(), &path, ExportFormat::Jsonl)
            .unwrap();
        assert!(read_jsonl(&path).unwrap().is_empty());
    }

    #[test]
    fn test_read_malformed_line() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.jsonl");
        std::fs::write(&path, "\n{\"nope\":1}\n").unwrap();

        match read_jsonl(&path).unwrap_err() {
            ExportError::Malformed { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let err = FileConversationExporter::new()
            .export(&sample_log(), &blocker.join("chat.txt"), ExportFormat::Text)
            .unwrap_err();
        assert!(matches!(err, ExportError::Write { .. }));
    }
}
