//! Configuration file loading for dbchat
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `DBCHAT_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./dbchat.toml` or `./.dbchat.toml`
//! 4. Global: `$XDG_CONFIG_HOME/dbchat/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, ConfigValidationError, FileAgentConfig, FileConfig, FileExportConfig,
    FileLoggingConfig, FileModelConfig, FileOpenAiConfig, FileProvidersConfig, FileReplConfig,
    FileRoutingConfig, Severity,
};
pub use loader::ConfigLoader;
