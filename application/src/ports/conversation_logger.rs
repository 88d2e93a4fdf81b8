//! Port for structured transcript logging.
//!
//! Defines the [`ConversationLogger`] trait for recording what the agents did
//! (delegate requests, generated statements, execution failures, outcomes) to
//! a structured log.
//!
//! This is separate from `tracing`-based operation logs and from the
//! user-facing conversation log: tracing handles human-readable diagnostics,
//! while this port captures a machine-readable transcript (JSONL).

use serde_json::Value;

/// A structured transcript event.
///
/// Each event has a type string and a JSON payload containing event-specific
/// fields. The adapter adds the timestamp when writing.
pub struct ConversationEvent {
    /// Event type identifier (e.g., "delegate_request", "statement", "execution_failed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for logging transcript events to a structured log.
///
/// Implementations write each event as a single record (e.g., one JSONL line).
/// `log` is synchronous and infallible; write failures are dropped.
pub trait ConversationLogger: Send + Sync {
    /// Record a transcript event.
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when the transcript is disabled.
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
