//! Source and sink abstraction traits
//!
//! The pipeline talks to the outside world only through these traits, so
//! every stage can be exercised with in-memory implementations.

use crate::adapters::cosmosdb::models::RecordDocument;
use crate::domain::{RawResult, Result, Table};
use async_trait::async_trait;

/// Anything that can produce a raw search API response
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Perform one query and return the parsed body
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::SourceError`] wrapped in `EtlError::Source`
    /// on any non-200 answer or network failure.
    async fn fetch(&self) -> Result<RawResult>;

    /// Endpoint queried, for logs
    fn endpoint(&self) -> &str;
}

/// Object storage bucket
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check that the bucket is reachable
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Store `body` under `key`, overwriting any existing object
    ///
    /// # Errors
    ///
    /// Returns `EtlError::TransferFailure` if the upload fails.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        sha256: &str,
    ) -> Result<()>;

    /// Bucket name, for logs
    fn bucket(&self) -> &str;
}

/// Relational table that is replaced wholesale on every run
#[async_trait]
pub trait RelationalStore: Send + Sync {
    /// Check that the database is reachable
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Create the destination table if it does not exist
    ///
    /// # Errors
    ///
    /// Returns `EtlError::LoadFailure` for anything but "already exists".
    async fn ensure_table(&self) -> Result<()>;

    /// Atomically replace every row of the table with `table`
    ///
    /// Returns the number of rows inserted.
    ///
    /// # Errors
    ///
    /// Returns `EtlError::LoadFailure`; the previous contents are kept.
    async fn replace_rows(&self, table: &Table) -> Result<u64>;

    /// Destination table name
    fn table_name(&self) -> &str;
}

/// Document collection keyed by document id
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Check that the account and database are reachable
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Create the destination container if it does not exist
    async fn ensure_container(&self) -> Result<()>;

    /// Write `document`, fully replacing any document with the same id
    async fn upsert_document(&self, document: &RecordDocument) -> Result<()>;

    /// Destination container name
    fn container_name(&self) -> &str;
}
