//! Conversation subdomain: the ordered chat log.

pub mod entities;
