//! sqlx-backed database adapter
//!
//! Implements the database ports for SQLite, PostgreSQL and MySQL.
//! MongoDB and Redis URIs are recognized but have no driver here.

mod connection;
mod connector;
mod decode;
mod introspect;

pub use connection::SqlxConnection;
pub use connector::SqlxConnector;
