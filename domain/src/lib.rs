//! Domain layer for dbchat
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Session
//!
//! A single active database context: the connection URI, the database kind
//! inferred from its scheme, the cached schema and a reusable connection
//! snippet. It is replaced wholesale on every successful connect.
//!
//! ## Conversation
//!
//! The ordered log of chat turns, used for display and export.
//!
//! ## Commands and intents
//!
//! Input lines parse into [`Command`]s; free text is routed by an explicit
//! [`Intent`] decision.

pub mod analytics;
pub mod command;
pub mod conversation;
pub mod core;
pub mod database;
pub mod prompt;
pub mod session;

// Re-export commonly used types
pub use analytics::{
    report::{AnalysisReport, AnalyticsKind},
    stats::{
        Bar, BarChart, CorrelationMatrix, CorrelationStrength, DatasetSummary,
        NumericColumnStats, TextColumnStats, percentage_of, scaled_width,
    },
};
pub use command::{
    intent::{HeuristicIntentClassifier, Intent},
    parser::{COMMAND_HELP, COMMAND_VERBS, Command},
};
pub use conversation::entities::{ConversationEntry, ConversationLog, Role};
pub use core::{error::DomainError, model::Model, question::Question};
pub use database::{
    kind::DbKind,
    result::{CellValue, QueryResult},
    schema::{ColumnDescriptor, SchemaCache},
    statement::{StatementKind, classify_statement, ensure_read_only, extract_statement},
    uri::{ConnectionUri, REDACTED, SqliteTarget, find_connection_uri},
};
pub use prompt::PromptTemplate;
pub use session::entities::{Session, SessionContext};
