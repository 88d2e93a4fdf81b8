//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod conversation_exporter;
pub mod conversation_logger;
pub mod database;
pub mod interpreter;
pub mod llm_gateway;
pub mod progress;
