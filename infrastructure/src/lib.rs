//! Infrastructure layer for dbchat
//!
//! This crate contains adapters that implement the ports defined
//! in the application layer, including configuration file loading.

pub mod config;
pub mod database;
pub mod export;
pub mod logging;
pub mod openai;

// Re-export commonly used types
pub use config::{
    ConfigIssue, ConfigLoader, ConfigValidationError, FileAgentConfig, FileConfig,
    FileExportConfig, FileLoggingConfig, FileModelConfig, FileOpenAiConfig, FileReplConfig,
    FileRoutingConfig, Severity,
};
pub use database::{SqlxConnection, SqlxConnector};
pub use export::{FileConversationExporter, read_jsonl};
pub use logging::JsonlConversationLogger;
pub use openai::{
    gateway::{OpenAiLlmGateway, OpenAiSettings},
    session::OpenAiSession,
};
