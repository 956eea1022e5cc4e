//! PostgreSQL adapter implementing the relational sink
//!
//! Replace-load semantics: after a successful load the table holds exactly
//! the rows of the current run, in table order (`row_number`).

use crate::adapters::postgresql::client::PostgreSQLClient;
use crate::adapters::sink::RelationalStore;
use crate::domain::{Result, Table};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;

/// PostgreSQL implementation of [`RelationalStore`]
pub struct PostgreSQLAdapter {
    client: Arc<PostgreSQLClient>,
}

impl PostgreSQLAdapter {
    /// Create a new PostgreSQL adapter
    pub fn new(client: PostgreSQLClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl RelationalStore for PostgreSQLAdapter {
    async fn test_connection(&self) -> Result<()> {
        self.client.test_connection().await
    }

    async fn ensure_table(&self) -> Result<()> {
        self.client.ensure_table().await
    }

    async fn replace_rows(&self, table: &Table) -> Result<u64> {
        self.client.replace_rows(table).await
    }

    fn table_name(&self) -> &str {
        self.client.table_name()
    }
}

/// Create the table if needed, then replace its contents with `table`
///
/// Returns the number of rows inserted.
///
/// # Errors
///
/// Returns [`crate::domain::EtlError::LoadFailure`]; a failed load leaves
/// the previous contents in place.
pub async fn replace_load(store: &dyn RelationalStore, table: &Table) -> Result<u64> {
    let started = Instant::now();

    store.ensure_table().await?;

    let inserted = store.replace_rows(table).await.map_err(|e| {
        tracing::error!(table = %store.table_name(), error = %e, "Relational load failed");
        e
    })?;

    tracing::info!(
        table = %store.table_name(),
        rows = inserted,
        duration_ms = started.elapsed().as_millis() as u64,
        "Relational table replaced"
    );

    Ok(inserted)
}
