//! Application-level configuration.
//!
//! - [`AgentParams`]: delegate loop control (steps, sandbox, timeouts)
//! - [`ClassifierMode`]: how free text is routed
//! - [`expand_home`]: `~/` in user-supplied paths

pub mod agent_params;
mod paths;

pub use agent_params::AgentParams;
pub use paths::expand_home;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How free-text input is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Keyword rules only
    #[default]
    Heuristic,
    /// Ask the interpreter, falling back to the keyword rules
    Model,
}

impl FromStr for ClassifierMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(ClassifierMode::Heuristic),
            "model" | "llm" => Ok(ClassifierMode::Model),
            other => Err(format!("Unknown classifier: {}", other)),
        }
    }
}
