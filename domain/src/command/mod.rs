//! Command routing concepts: parsed input lines and free-text intents.

pub mod intent;
pub mod parser;
