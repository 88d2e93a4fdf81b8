//! Model configuration from TOML (`[model]` section)

use super::{ConfigIssue, ConfigValidationError, Severity};
use dbchat_domain::Model;
use serde::{Deserialize, Serialize};

/// Raw model configuration from TOML
///
/// # Example
///
/// ```toml
/// [model]
/// name = "gpt-4o-mini"
/// temperature = 0.1
/// history_turns = 20
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileModelConfig {
    /// Model driven by the interpreter
    pub name: Model,
    /// Sampling temperature; omitted from requests when unset
    pub temperature: Option<f32>,
    /// Conversation turns (question and reply) resent with each chat message
    pub history_turns: usize,
}

impl Default for FileModelConfig {
    fn default() -> Self {
        Self {
            name: Model::default(),
            temperature: None,
            history_turns: 20,
        }
    }
}

impl FileModelConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.name.as_str().trim().is_empty() {
            issues.push(ConfigIssue::error(ConfigValidationError::EmptyModelName));
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            issues.push(ConfigIssue {
                severity: Severity::Error,
                error: ConfigValidationError::InvalidTemperature(t),
            });
        }
        if self.history_turns == 0 {
            issues.push(ConfigIssue::error(ConfigValidationError::ZeroValue {
                field: "model.history_turns",
            }));
        }
        issues
    }
}
