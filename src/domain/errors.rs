//! Domain error types
//!
//! This module defines the error hierarchy for the SUS extract. Each pipeline
//! stage has a dedicated variant so that failures carry the stage name and the
//! underlying cause. Third-party error types are converted to strings at the
//! adapter boundary and never leak through this API.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Pipeline stage identifiers
///
/// Used to attribute failures and outcomes to a specific step of the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Query the source API
    Fetch,
    /// Flatten raw hits into a table
    Flatten,
    /// Write the local delimited/columnar files
    File,
    /// Upload the files to object storage
    Bucket,
    /// Replace-load the relational table
    Relational,
    /// Write one document per record to the document store
    Documents,
}

impl Stage {
    /// Stable lowercase name used in logs and reports
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Fetch => "fetch",
            Stage::Flatten => "flatten",
            Stage::File => "file",
            Stage::Bucket => "bucket",
            Stage::Relational => "relational",
            Stage::Documents => "documents",
        }
    }

    /// Whether this stage is a sink (runs after the table exists)
    pub fn is_sink(&self) -> bool {
        !matches!(self, Stage::Fetch | Stage::Flatten)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Main error type
///
/// This is the primary error type used throughout the crate.
#[derive(Debug, Error)]
pub enum EtlError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source API errors
    #[error("Source API error: {0}")]
    Source(#[from] SourceError),

    /// The API response did not have the expected shape
    #[error("Structural mismatch: {0}")]
    StructuralMismatch(String),

    /// Local file write/read failure
    #[error("I/O failure on {path}: {message}")]
    IoFailure { path: String, message: String },

    /// Upload to object storage failed
    #[error("Transfer of object '{key}' failed: {message}")]
    TransferFailure { key: String, message: String },

    /// Relational load failed
    #[error("Load into table '{table}' failed: {message}")]
    LoadFailure { table: String, message: String },

    /// Document-store write failed part way through
    #[error(
        "Document write failed at '{document_id}' ({written}/{total} written): {message}"
    )]
    DocumentWriteFailure {
        document_id: String,
        written: usize,
        total: usize,
        message: String,
    },

    /// Document store client or container failure
    #[error("Document store error: {0}")]
    DocumentStore(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A pipeline stage failed
    #[error("Stage '{stage}' failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: Box<EtlError>,
    },
}

impl EtlError {
    /// Wraps an error with the stage it occurred in
    pub fn in_stage(self, stage: Stage) -> Self {
        EtlError::Stage {
            stage,
            source: Box::new(self),
        }
    }

    /// Returns the failing stage, if this error was attributed to one
    pub fn stage(&self) -> Option<Stage> {
        match self {
            EtlError::Stage { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Returns the innermost error, unwrapping stage attribution
    pub fn root(&self) -> &EtlError {
        match self {
            EtlError::Stage { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Source API errors
///
/// Errors that occur when querying the immunization search API.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The API answered with a status other than 200
    #[error("Authentication failure (HTTP {status}): {message}")]
    AuthFailure { status: u16, message: String },

    /// Network-level failure (DNS, connect, TLS)
    #[error("Failed to connect to source API: {0}")]
    Connection(String),

    /// Request timed out
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// Body was not valid JSON
    #[error("Invalid response from source API: {0}")]
    InvalidResponse(String),
}

impl SourceError {
    /// HTTP status of the failed response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::AuthFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EtlError {
    fn from(err: serde_json::Error) -> Self {
        EtlError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for EtlError {
    fn from(err: toml::de::Error) -> Self {
        EtlError::Configuration(format!("TOML parse error: {err}"))
    }
}
