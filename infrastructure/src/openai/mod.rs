//! OpenAI-compatible chat completions adapter
//!
//! Implements LlmGateway over HTTP. Any server speaking the
//! `/chat/completions` protocol works by pointing `base_url` at it.

pub mod gateway;
pub mod protocol;
pub mod session;
