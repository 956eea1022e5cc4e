//! S3-compatible object storage client
//!
//! Works against AWS S3 and any S3-compatible endpoint (Google Cloud
//! Storage XML interop, MinIO) through `endpoint_url` and path-style
//! addressing.

use crate::adapters::sink::ObjectStore;
use crate::config::StorageConfig;
use crate::domain::{EtlError, Result};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;
use secrecy::ExposeSecret;

/// Object store backed by aws-sdk-s3
pub struct S3ObjectStore {
    client: S3Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Build a client from configuration
    ///
    /// Static credentials are used when configured, otherwise the default
    /// AWS credential chain.
    pub async fn new(config: &StorageConfig) -> Result<Self> {
        let shared_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared_config)
            .force_path_style(config.force_path_style);

        if let Some(ref endpoint) = config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        if let (Some(access_key_id), Some(secret_access_key)) =
            (&config.access_key_id, &config.secret_access_key)
        {
            builder = builder.credentials_provider(Credentials::new(
                access_key_id.clone(),
                secret_access_key.expose_secret().as_ref().to_string(),
                None,
                None,
                "sus-etl-config",
            ));
        }

        tracing::debug!(
            bucket = %config.bucket,
            region = %config.region,
            endpoint = ?config.endpoint_url,
            "Object storage client configured"
        );

        Ok(Self {
            client: S3Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn test_connection(&self) -> Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| EtlError::TransferFailure {
                key: String::new(),
                message: format!(
                    "Bucket {} is not reachable: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ),
            })?;

        tracing::info!(bucket = %self.bucket, "Object storage connection test successful");
        Ok(())
    }

    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
        sha256: &str,
    ) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .metadata("sha256", sha256)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| EtlError::TransferFailure {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(())
    }

    fn bucket(&self) -> &str {
        &self.bucket
    }
}
