//! Presentation-level configuration
//!
//! Configuration for REPL behavior.

use std::path::PathBuf;

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Default)]
pub struct ReplConfig {
    /// Path to history file; `<data_dir>/dbchat/history.txt` when unset
    pub history_file: Option<PathBuf>,
    /// Line to run before the first prompt, e.g. `/connect <uri>`
    pub startup_line: Option<String>,
}

impl ReplConfig {
    /// Where line history is loaded from and saved to
    pub fn history_path(&self) -> Option<PathBuf> {
        self.history_file
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("dbchat").join("history.txt")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_history_file_wins() {
        let config = ReplConfig {
            history_file: Some(PathBuf::from("/tmp/h.txt")),
            ..Default::default()
        };
        assert_eq!(config.history_path(), Some(PathBuf::from("/tmp/h.txt")));
    }

    #[test]
    fn test_default_history_under_data_dir() {
        if let Some(path) = ReplConfig::default().history_path() {
            assert!(path.ends_with("dbchat/history.txt"));
        }
    }
}
