//! Cosmos DB client implementation
//!
//! This module provides the client for interacting with Azure Cosmos DB.

use crate::adapters::cosmosdb::models::RecordDocument;
use crate::config::CosmosDbConfig;
use crate::domain::{EtlError, Result};
use azure_core::credentials::Secret;
use azure_core::http::StatusCode;
use azure_data_cosmos::clients::{ContainerClient, DatabaseClient};
use azure_data_cosmos::models::{ContainerProperties, IndexingPolicy, PartitionKeyDefinition};
use azure_data_cosmos::{CosmosClient, CosmosClientOptions, PartitionKey};
use std::borrow::Cow;

/// Cosmos DB client for the record container
///
/// Provides methods for connecting to Azure Cosmos DB, creating the
/// container and writing record documents.
pub struct CosmosDbClient {
    /// Cosmos DB client
    client: CosmosClient,

    /// Database client
    database: DatabaseClient,

    /// Configuration
    config: CosmosDbConfig,
}

impl CosmosDbClient {
    /// Create a new Cosmos DB client
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub async fn new(config: CosmosDbConfig) -> Result<Self> {
        use secrecy::ExposeSecret;

        let key = Secret::new(config.key.expose_secret().as_ref().to_string());
        let options = Some(CosmosClientOptions::default());

        let client = CosmosClient::with_key(&config.endpoint, key, options).map_err(|e| {
            EtlError::Configuration(format!("Failed to create Cosmos client: {e}"))
        })?;

        let database = client.database_client(&config.database_name);

        Ok(Self {
            client,
            database,
            config,
        })
    }

    /// Test the connection to Cosmos DB
    ///
    /// Attempts to read the database to verify connectivity.
    pub async fn test_connection(&self) -> Result<()> {
        self.database.read(None).await.map_err(|e| {
            EtlError::DocumentStore(format!("Connection test failed: {e}"))
        })?;

        tracing::info!(
            endpoint = %self.endpoint(),
            database = %self.config.database_name,
            "Cosmos DB connection test successful"
        );
        Ok(())
    }

    /// Ensure the database exists, creating it if necessary
    pub async fn ensure_database_exists(&self) -> Result<()> {
        match self.database.read(None).await {
            Ok(_) => {
                tracing::debug!(database = %self.config.database_name, "Database already exists");
                Ok(())
            }
            Err(e) if !is_not_found(e.http_status()) => Err(EtlError::DocumentStore(format!(
                "Failed to read database {}: {e}",
                self.config.database_name
            ))),
            Err(_) => {
                tracing::info!(database = %self.config.database_name, "Creating database");

                self.client
                    .create_database(&self.config.database_name, None)
                    .await
                    .map_err(|e| {
                        EtlError::DocumentStore(format!(
                            "Failed to create database {}: {e}",
                            self.config.database_name
                        ))
                    })?;

                tracing::info!(database = %self.config.database_name, "Database created successfully");
                Ok(())
            }
        }
    }

    /// Ensure the record container exists, creating it if necessary
    ///
    /// Partition key: `/id`
    pub async fn ensure_container_exists(&self) -> Result<()> {
        let container_name = &self.config.container_name;
        let container = self.container_client();

        match container.read(None).await {
            Ok(_) => {
                tracing::debug!(container = %container_name, "Container already exists");
                Ok(())
            }
            Err(e) if !is_not_found(e.http_status()) => Err(EtlError::DocumentStore(format!(
                "Failed to read container {container_name}: {e}"
            ))),
            Err(_) => {
                tracing::info!(container = %container_name, "Creating container");

                let partition_key_def = PartitionKeyDefinition {
                    paths: vec!["/id".to_string()],
                    kind: azure_data_cosmos::models::PartitionKeyKind::Hash,
                    version: None,
                };

                let properties = ContainerProperties {
                    id: Cow::Owned(container_name.clone()),
                    partition_key: partition_key_def,
                    indexing_policy: Some(IndexingPolicy::default()),
                    ..Default::default()
                };

                self.database
                    .create_container(properties, None)
                    .await
                    .map_err(|e| {
                        EtlError::DocumentStore(format!(
                            "Failed to create container {container_name}: {e}"
                        ))
                    })?;

                tracing::info!(container = %container_name, "Container created successfully");
                Ok(())
            }
        }
    }

    /// Get the record container client
    pub fn container_client(&self) -> ContainerClient {
        self.database.container_client(&self.config.container_name)
    }

    /// Upsert one record document, replacing any document with the same id
    pub async fn upsert_document(&self, document: &RecordDocument) -> Result<()> {
        let container = self.container_client();
        let partition_key = PartitionKey::from(document.id.clone());

        container
            .upsert_item(partition_key, document, None)
            .await
            .map_err(|e| EtlError::DocumentStore(format!("Upsert of {} failed: {e}", document.id)))?;

        Ok(())
    }

    /// Get the database name
    pub fn database_name(&self) -> &str {
        &self.config.database_name
    }

    /// Get the container name
    pub fn container_name(&self) -> &str {
        &self.config.container_name
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

/// A read that failed with 404; any other failure is not a missing resource
fn is_not_found(status: Option<StatusCode>) -> bool {
    status == Some(StatusCode::NotFound)
}
