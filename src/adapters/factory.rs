//! Client factories
//!
//! Builds the production source and sink implementations from
//! configuration. A sink without a configuration section yields `None`.

use crate::adapters::cosmosdb::{CosmosDbAdapter, CosmosDbClient};
use crate::adapters::postgresql::{PostgreSQLAdapter, PostgreSQLClient};
use crate::adapters::sink::{DocumentStore, ObjectStore, RecordSource, RelationalStore};
use crate::adapters::storage::S3ObjectStore;
use crate::adapters::sus::SusClient;
use crate::config::schema::EtlConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Create the search API client
pub fn create_record_source(config: &EtlConfig) -> Result<Arc<dyn RecordSource>> {
    let client = SusClient::new(config.source.clone())?;
    Ok(Arc::new(client) as Arc<dyn RecordSource>)
}

/// Create the object store, if `[storage]` is configured
pub async fn create_object_store(config: &EtlConfig) -> Result<Option<Arc<dyn ObjectStore>>> {
    let Some(ref storage_config) = config.storage else {
        return Ok(None);
    };

    tracing::info!(bucket = %storage_config.bucket, "Creating object storage client");
    let store = S3ObjectStore::new(storage_config).await?;
    Ok(Some(Arc::new(store) as Arc<dyn ObjectStore>))
}

/// Create the relational store, if `[postgresql]` is configured
pub async fn create_relational_store(
    config: &EtlConfig,
) -> Result<Option<Arc<dyn RelationalStore>>> {
    let Some(ref pg_config) = config.postgresql else {
        return Ok(None);
    };

    tracing::info!(table = %pg_config.table_name, "Creating PostgreSQL client");
    let client = PostgreSQLClient::new(pg_config.clone()).await?;
    let adapter = PostgreSQLAdapter::new(client);
    Ok(Some(Arc::new(adapter) as Arc<dyn RelationalStore>))
}

/// Create the document store, if `[cosmosdb]` is configured
pub async fn create_document_store(config: &EtlConfig) -> Result<Option<Arc<dyn DocumentStore>>> {
    let Some(ref cosmos_config) = config.cosmosdb else {
        return Ok(None);
    };

    tracing::info!(
        database = %cosmos_config.database_name,
        container = %cosmos_config.container_name,
        "Creating Cosmos DB client"
    );
    let client = CosmosDbClient::new(cosmos_config.clone()).await?;
    let adapter = CosmosDbAdapter::new(client);
    Ok(Some(Arc::new(adapter) as Arc<dyn DocumentStore>))
}
