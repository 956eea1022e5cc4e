//! PostgreSQL integration
//!
//! Replace-loads the flat table into a single relational table.

pub mod adapter;
pub mod client;

pub use adapter::{replace_load, PostgreSQLAdapter};
pub use client::{redact_connection_string, PostgreSQLClient};
