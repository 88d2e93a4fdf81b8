//! Session subdomain: the single active database context.

pub mod entities;
