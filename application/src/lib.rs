//! Application layer for dbchat
//!
//! This crate contains use cases, port definitions, and application configuration.
//! It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::{AgentParams, ClassifierMode, expand_home};
pub use ports::{
    conversation_exporter::{ConversationExporter, ExportError, ExportFormat},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    database::{DatabaseConnection, DatabaseConnector, DatabaseError},
    interpreter::{FailedAttempt, Interpreter, InterpreterError},
    llm_gateway::{GatewayError, LlmGateway, LlmSession},
    progress::{NoProgress, ProgressNotifier},
};
pub use use_cases::chat_controller::{
    ChatController, DEFAULT_HISTORY_DISPLAY, ExportSettings, Reply, analytics_help,
};
pub use use_cases::dispatch::{
    AgentDispatcher, AnalysisAnswer, DelegateOutcome, DelegateRequest, DispatchError, QueryAnswer,
};
pub use use_cases::interpret::LlmInterpreter;
pub use use_cases::route_intent::IntentRouter;
pub use use_cases::session_state::SessionState;
