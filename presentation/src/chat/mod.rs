//! Interactive chat module
//!
//! Provides a readline-based interactive chat interface for dbchat.

mod repl;

pub use repl::ChatRepl;
