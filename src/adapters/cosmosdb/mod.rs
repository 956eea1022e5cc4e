//! Azure Cosmos DB integration
//!
//! Stores one document per flat record in a single container.

pub mod adapter;
pub mod client;
pub mod models;

pub use adapter::{write_documents, CosmosDbAdapter};
pub use client::CosmosDbClient;
pub use models::{document_id, RecordDocument};
