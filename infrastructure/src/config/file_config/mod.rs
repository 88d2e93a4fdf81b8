//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod agent;
mod export;
mod logging;
mod model;
mod providers;
mod repl;
mod routing;

pub use agent::FileAgentConfig;
pub use export::FileExportConfig;
pub use logging::FileLoggingConfig;
pub use model::FileModelConfig;
pub use providers::{FileOpenAiConfig, FileProvidersConfig};
pub use repl::FileReplConfig;
pub use routing::FileRoutingConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigValidationError {
    #[error("model.name cannot be empty")]
    EmptyModelName,

    #[error("model.temperature must be between 0.0 and 2.0, got {0}")]
    InvalidTemperature(f32),

    #[error("{field} cannot be 0")]
    ZeroValue { field: &'static str },

    #[error("{field}: unknown value '{value}' (valid: {valid})")]
    InvalidEnumValue {
        field: &'static str,
        value: String,
        valid: &'static str,
    },

    #[error("providers.openai.base_url is not a valid URL: {0}")]
    InvalidBaseUrl(String),
}

/// How serious a configuration issue is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A fallback value is used
    Warning,
    /// The configuration cannot be used
    Error,
}

/// One problem found by [`FileConfig::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub error: ConfigValidationError,
}

impl ConfigIssue {
    pub fn warning(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Warning,
            error,
        }
    }

    pub fn error(error: ConfigValidationError) -> Self {
        Self {
            severity: Severity::Error,
            error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Interpreter model
    pub model: FileModelConfig,
    /// Provider settings (API key, endpoint)
    pub providers: FileProvidersConfig,
    /// Delegate settings
    pub agent: FileAgentConfig,
    /// Free-text routing
    pub routing: FileRoutingConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Conversation export settings
    pub export: FileExportConfig,
    /// Log destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.model.validate());
        issues.extend(self.agent.validate());
        issues.extend(self.routing.parse_classifier().1);
        issues.extend(self.export.parse_format().1);

        if url::Url::parse(&self.providers.openai.base_url).is_err() {
            issues.push(ConfigIssue::error(ConfigValidationError::InvalidBaseUrl(
                self.providers.openai.base_url.clone(),
            )));
        }
        if self.providers.openai.timeout_seconds == 0 {
            issues.push(ConfigIssue::error(ConfigValidationError::ZeroValue {
                field: "providers.openai.timeout_seconds",
            }));
        }

        issues
    }
}
