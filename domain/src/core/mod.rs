//! Core domain concepts shared across all subdomains.
//!
//! - [`model::Model`] : hosted language models the interpreter can drive
//! - [`question::Question`] : a validated natural-language question
//! - [`error::DomainError`] : domain-level errors

pub mod error;
pub mod model;
pub mod question;
pub mod string;
