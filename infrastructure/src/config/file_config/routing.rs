//! Routing configuration from TOML (`[routing]` section)

use super::{ConfigIssue, ConfigValidationError};
use dbchat_application::ClassifierMode;
use serde::{Deserialize, Serialize};

/// How free-text input is classified: `"heuristic"` or `"model"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    pub classifier: String,
}

impl Default for FileRoutingConfig {
    fn default() -> Self {
        Self {
            classifier: "heuristic".to_string(),
        }
    }
}

impl FileRoutingConfig {
    /// Parse the classifier, falling back to the heuristic with a warning.
    pub fn parse_classifier(&self) -> (ClassifierMode, Vec<ConfigIssue>) {
        match self.classifier.parse::<ClassifierMode>() {
            Ok(mode) => (mode, vec![]),
            Err(_) => (
                ClassifierMode::default(),
                vec![ConfigIssue::warning(ConfigValidationError::InvalidEnumValue {
                    field: "routing.classifier",
                    value: self.classifier.clone(),
                    valid: "heuristic, model",
                })],
            ),
        }
    }
}
