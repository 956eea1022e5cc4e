//! Cosmos DB adapter implementing the document sink

use crate::adapters::cosmosdb::client::CosmosDbClient;
use crate::adapters::cosmosdb::models::RecordDocument;
use crate::adapters::sink::DocumentStore;
use crate::domain::{EtlError, Result, Table};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// Cosmos DB implementation of [`DocumentStore`]
pub struct CosmosDbAdapter {
    client: Arc<CosmosDbClient>,
}

impl CosmosDbAdapter {
    /// Create a new Cosmos DB adapter
    pub fn new(client: CosmosDbClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl DocumentStore for CosmosDbAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_container(&self) -> Result<()> {
        self.client.ensure_database_exists().await?;
        self.client.ensure_container_exists().await
    }

    async fn upsert_document(&self, document: &RecordDocument) -> Result<()> {
        self.client.upsert_document(document).await
    }

    fn container_name(&self) -> &str {
        self.client.container_name()
    }
}

/// Write one document per record, `record_<i>` for the record at index `i`
///
/// Writes are sequential and stop at the first failure. Documents written
/// before the failure are kept. Re-running with the same table leaves the
/// same set of documents.
///
/// # Errors
///
/// Returns [`EtlError::DocumentWriteFailure`] naming the failing document
/// and how many were written before it.
pub async fn write_documents(store: &dyn DocumentStore, table: &Table) -> Result<usize> {
    let started = Instant::now();
    let total = table.len();

    store.ensure_container().await?;

    for (index, record) in table.iter().enumerate() {
        let document = RecordDocument::new(index, record.clone());

        if let Err(e) = store.upsert_document(&document).await {
            tracing::error!(
                container = %store.container_name(),
                document_id = %document.id,
                written = index,
                total = total,
                error = %e,
                "Document write failed"
            );
            return Err(EtlError::DocumentWriteFailure {
                document_id: document.id,
                written: index,
                total,
                message: e.to_string(),
            });
        }
    }

    tracing::info!(
        container = %store.container_name(),
        documents = total,
        duration_ms = started.elapsed().as_millis() as u64,
        "Documents written"
    );

    Ok(total)
}
