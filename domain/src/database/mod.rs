//! Database concepts: kinds, URIs, schemas, results and statements.

pub mod kind;
pub mod result;
pub mod schema;
pub mod statement;
pub mod uri;
