//! Prompt domain
//!
//! Templates for translation, summarization, conversation and intent
//! classification prompts.

mod template;

pub use template::PromptTemplate;
