//! Agent configuration from TOML (`[agent]` section)

use super::{ConfigIssue, ConfigValidationError};
use dbchat_application::AgentParams;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Raw agent configuration from TOML
///
/// # Example
///
/// ```toml
/// [agent]
/// max_steps = 3                  # translate/execute attempts per request
/// sandbox = true                 # reject statements that write
/// connect_timeout_seconds = 45
/// summarize_results = true
/// row_limit = 1000
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    pub max_steps: usize,
    pub sandbox: bool,
    pub connect_timeout_seconds: u64,
    pub summarize_results: bool,
    pub row_limit: usize,
}

impl Default for FileAgentConfig {
    fn default() -> Self {
        let params = AgentParams::default();
        Self {
            max_steps: params.max_steps,
            sandbox: params.sandbox,
            connect_timeout_seconds: params.connect_timeout.as_secs(),
            summarize_results: params.summarize_results,
            row_limit: params.row_limit,
        }
    }
}

impl FileAgentConfig {
    pub fn to_params(&self) -> AgentParams {
        AgentParams::default()
            .with_max_steps(self.max_steps)
            .with_sandbox(self.sandbox)
            .with_connect_timeout(Duration::from_secs(self.connect_timeout_seconds))
            .with_summarize_results(self.summarize_results)
            .with_row_limit(self.row_limit)
    }

    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        for (field, value) in [
            ("agent.max_steps", self.max_steps as u64),
            ("agent.connect_timeout_seconds", self.connect_timeout_seconds),
            ("agent.row_limit", self.row_limit as u64),
        ] {
            if value == 0 {
                issues.push(ConfigIssue::error(ConfigValidationError::ZeroValue { field }));
            }
        }
        issues
    }
}
