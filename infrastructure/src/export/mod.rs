//! Conversation export to files

mod file_exporter;

pub use file_exporter::{FileConversationExporter, read_jsonl};
