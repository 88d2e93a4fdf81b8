//! Agent parameters: delegate loop control.
//!
//! [`AgentParams`] groups the static parameters that control the delegates
//! run by the [`AgentDispatcher`](crate::use_cases::dispatch::AgentDispatcher).

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Delegate loop control parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Maximum translate/execute attempts per request (at least 1).
    pub max_steps: usize,
    /// Reject statements that are not read-only.
    pub sandbox: bool,
    /// Limit for connecting and probing a database.
    pub connect_timeout: Duration,
    /// Ask the interpreter to explain query results.
    pub summarize_results: bool,
    /// Maximum rows read from one statement.
    pub row_limit: usize,
}

impl Default for AgentParams {
    fn default() -> Self {
        Self {
            max_steps: 3,
            sandbox: true,
            connect_timeout: Duration::from_secs(45),
            summarize_results: true,
            row_limit: 1000,
        }
    }
}

impl AgentParams {
    // ==================== Builder Methods ====================

    pub fn with_max_steps(mut self, max: usize) -> Self {
        self.max_steps = max.max(1);
        self
    }

    pub fn with_sandbox(mut self, sandbox: bool) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_summarize_results(mut self, summarize: bool) -> Self {
        self.summarize_results = summarize;
        self
    }

    pub fn with_row_limit(mut self, limit: usize) -> Self {
        self.row_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default() {
        let params = AgentParams::default();
        assert_eq!(params.max_steps, 3);
        assert!(params.sandbox);
        assert_eq!(params.connect_timeout, Duration::from_secs(45));
        assert!(params.summarize_results);
        assert_eq!(params.row_limit, 1000);
    }

    #[test]
    fn test_builder() {
        let params = AgentParams::default()
            .with_max_steps(0)
            .with_sandbox(false)
            .with_row_limit(50);

        assert_eq!(params.max_steps, 1);
        assert!(!params.sandbox);
        assert_eq!(params.row_limit, 50);
    }
}
