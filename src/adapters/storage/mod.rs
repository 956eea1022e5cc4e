//! Object storage upload
//!
//! Uploads the local output files to a bucket under fixed keys, so each run
//! overwrites the previous objects.

pub mod client;

pub use client::S3ObjectStore;

use crate::adapters::file::{FileOutputs, OutputFile, CSV_CONTENT_TYPE, PARQUET_CONTENT_TYPE};
use crate::adapters::sink::ObjectStore;
use crate::config::StorageConfig;
use crate::domain::{EtlError, Result};

/// One object written by [`upload_outputs`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub key: String,
    pub size_bytes: u64,
}

/// Upload every file in `outputs` to the bucket
///
/// The CSV goes to `csv_object_key`, the Parquet file (when present) to
/// `parquet_object_key`. No retry.
///
/// # Errors
///
/// Returns [`EtlError::TransferFailure`] for the first object that fails,
/// or [`EtlError::IoFailure`] if a local file cannot be read.
pub async fn upload_outputs(
    store: &dyn ObjectStore,
    outputs: &FileOutputs,
    config: &StorageConfig,
) -> Result<Vec<UploadedObject>> {
    let mut uploads = vec![(&outputs.csv, config.csv_object_key.as_str(), CSV_CONTENT_TYPE)];
    if let Some(ref parquet) = outputs.parquet {
        uploads.push((parquet, config.parquet_object_key.as_str(), PARQUET_CONTENT_TYPE));
    }

    let mut uploaded = Vec::with_capacity(uploads.len());
    for (file, key, content_type) in uploads {
        uploaded.push(upload_file(store, file, key, content_type).await?);
    }

    Ok(uploaded)
}

async fn upload_file(
    store: &dyn ObjectStore,
    file: &OutputFile,
    key: &str,
    content_type: &str,
) -> Result<UploadedObject> {
    let body = tokio::fs::read(&file.path)
        .await
        .map_err(|e| EtlError::IoFailure {
            path: file.path.display().to_string(),
            message: format!("Failed to read file for upload: {e}"),
        })?;
    let size_bytes = body.len() as u64;

    store
        .put_object(key, body, content_type, &file.sha256)
        .await
        .map_err(|e| {
            tracing::error!(bucket = %store.bucket(), key = %key, error = %e, "Upload failed");
            e
        })?;

    tracing::info!(
        bucket = %store.bucket(),
        key = %key,
        bytes = size_bytes,
        sha256 = %file.sha256,
        "Object uploaded"
    );

    Ok(UploadedObject {
        key: key.to_string(),
        size_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file::write_outputs;
    use crate::config::OutputConfig;
    use crate::domain::{FlatRecord, Table};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct InMemoryBucket {
        objects: Mutex<HashMap<String, (Vec<u8>, String, String)>>,
        reject_key: Option<String>,
    }

    #[async_trait]
    impl ObjectStore for InMemoryBucket {
        async fn put_object(
            &self,
            key: &str,
            body: Vec<u8>,
            content_type: &str,
            sha256: &str,
        ) -> Result<()> {
            if self.reject_key.as_deref() == Some(key) {
                return Err(EtlError::TransferFailure {
                    key: key.to_string(),
                    message: "AccessDenied".to_string(),
                });
            }
            self.objects.lock().unwrap().insert(
                key.to_string(),
                (body, content_type.to_string(), sha256.to_string()),
            );
            Ok(())
        }

        fn bucket(&self) -> &str {
            "stack-sus"
        }
    }

    fn storage_config() -> StorageConfig {
        toml::from_str(r#"bucket = "stack-sus""#).unwrap()
    }

    fn written_outputs(dir: &std::path::Path, columnar: bool) -> FileOutputs {
        let config = OutputConfig {
            directory: dir.display().to_string(),
            columnar_enabled: columnar,
            ..Default::default()
        };
        let table: Table = vec![FlatRecord {
            patient_age: Some(45),
            ..Default::default()
        }]
        .into();
        write_outputs(&table, &config).unwrap()
    }

    #[tokio::test]
    async fn test_upload_outputs_uses_fixed_keys() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = written_outputs(dir.path(), true);
        let bucket = InMemoryBucket::default();

        let uploaded = upload_outputs(&bucket, &outputs, &storage_config())
            .await
            .unwrap();

        let keys: Vec<&str> = uploaded.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["sus_data.csv", "sus_data.parquet"]);

        let objects = bucket.objects.lock().unwrap();
        let (body, content_type, sha256) = &objects["sus_data.csv"];
        assert_eq!(body, &std::fs::read(&outputs.csv.path).unwrap());
        assert_eq!(content_type, CSV_CONTENT_TYPE);
        assert_eq!(sha256, &outputs.csv.sha256);
        assert_eq!(objects["sus_data.parquet"].1, PARQUET_CONTENT_TYPE);
    }

    #[tokio::test]
    async fn test_upload_outputs_csv_only() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = written_outputs(dir.path(), false);
        let bucket = InMemoryBucket::default();

        let uploaded = upload_outputs(&bucket, &outputs, &storage_config())
            .await
            .unwrap();
        assert_eq!(uploaded.len(), 1);
    }

    #[tokio::test]
    async fn test_upload_failure_names_key() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = written_outputs(dir.path(), true);
        let bucket = InMemoryBucket {
            reject_key: Some("sus_data.parquet".to_string()),
            ..Default::default()
        };

        match upload_outputs(&bucket, &outputs, &storage_config()).await {
            Err(EtlError::TransferFailure { key, .. }) => assert_eq!(key, "sus_data.parquet"),
            other => panic!("Expected TransferFailure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_missing_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = written_outputs(dir.path(), false);
        std::fs::remove_file(&outputs.csv.path).unwrap();

        let result = upload_outputs(&InMemoryBucket::default(), &outputs, &storage_config()).await;
        assert!(matches!(result, Err(EtlError::IoFailure { .. })));
    }
}
