//! Transcript logging: delegate activity as JSONL.
//!
//! Provides [`JsonlConversationLogger`], which implements the
//! [`ConversationLogger`](dbchat_application::ConversationLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlConversationLogger;
