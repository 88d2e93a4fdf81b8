//! Export configuration from TOML (`[export]` section)

use super::{ConfigIssue, ConfigValidationError};
use dbchat_application::ExportFormat;
use serde::{Deserialize, Serialize};

/// Raw export configuration from TOML
///
/// ```toml
/// [export]
/// directory = "~/chats"
/// format = "markdown"     # "text", "markdown" or "jsonl"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileExportConfig {
    /// Directory for `/export` without a path
    pub directory: String,
    /// Format for `/export` when the path has no known extension
    pub format: String,
}

impl Default for FileExportConfig {
    fn default() -> Self {
        Self {
            directory: ".".to_string(),
            format: "text".to_string(),
        }
    }
}

impl FileExportConfig {
    pub fn parse_format(&self) -> (ExportFormat, Vec<ConfigIssue>) {
        match self.format.parse::<ExportFormat>() {
            Ok(format) => (format, vec![]),
            Err(_) => (
                ExportFormat::default(),
                vec![ConfigIssue::warning(ConfigValidationError::InvalidEnumValue {
                    field: "export.format",
                    value: self.format.clone(),
                    valid: "text, markdown, jsonl",
                })],
            ),
        }
    }
}
