//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

/// Raw logging configuration from TOML
///
/// ```toml
/// [logging]
/// file = "~/.local/share/dbchat/logs/dbchat.log"            # daily-rolling operation log
/// transcript = "~/.local/share/dbchat/transcript.jsonl"     # JSONL agent transcript
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Write operation logs here instead of stderr
    pub file: Option<String>,
    /// JSONL transcript of delegate activity
    pub transcript: Option<String>,
}
