//! Source and sink seams
//!
//! Traits implemented by the production adapters (reqwest, S3, PostgreSQL,
//! Cosmos DB) and by in-memory fakes in tests.

pub mod traits;

pub use traits::{DocumentStore, ObjectStore, RecordSource, RelationalStore};
