//! REPL configuration from TOML (`[repl]` section)

use dbchat_application::DEFAULT_HISTORY_DISPLAY;
use serde::{Deserialize, Serialize};

/// Raw REPL configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileReplConfig {
    /// Show progress indicators
    pub show_progress: bool,
    /// Path to history file
    pub history_file: Option<String>,
    /// Entries shown by `/history` without a count
    pub history_display: usize,
}

impl Default for FileReplConfig {
    fn default() -> Self {
        Self {
            show_progress: true,
            history_file: None,
            history_display: DEFAULT_HISTORY_DISPLAY,
        }
    }
}
