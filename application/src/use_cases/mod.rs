//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod chat_controller;
pub mod dispatch;
pub mod interpret;
pub mod route_intent;
pub mod session_state;
