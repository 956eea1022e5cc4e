//! Immunization search API client
//!
//! Issues a single authenticated GET against the search endpoint and hands
//! back the parsed JSON body. No retries.

use crate::adapters::sink::RecordSource;
use crate::config::SourceConfig;
use crate::domain::{EtlError, RawResult, Result, SourceError};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use reqwest::{Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Longest response body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Client for the SUS immunization search API
///
/// # Example
///
/// ```no_run
/// use sus_etl::adapters::sus::SusClient;
/// use sus_etl::adapters::sink::RecordSource;
/// use sus_etl::config::{secret_string, SourceConfig};
///
/// # async fn example() -> sus_etl::domain::Result<()> {
/// let config = SourceConfig {
///     username: Some("imunizacao_public".to_string()),
///     password: Some(secret_string("password".to_string())),
///     ..Default::default()
/// };
/// let client = SusClient::new(config)?;
/// let raw = client.fetch().await?;
/// # Ok(())
/// # }
/// ```
pub struct SusClient {
    client: Client,
    config: SourceConfig,
    auth_header: String,
}

impl SusClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if credentials are missing or the HTTP
    /// client cannot be built.
    pub fn new(config: SourceConfig) -> Result<Self> {
        let username = config.username.as_deref().ok_or_else(|| {
            EtlError::Configuration("source.username is required".to_string())
        })?;
        let password = config.password.as_ref().ok_or_else(|| {
            EtlError::Configuration("source.password is required".to_string())
        })?;

        let credentials = format!("{}:{}", username, password.expose_secret().as_ref());
        let auth_header = format!(
            "Basic {}",
            general_purpose::STANDARD.encode(credentials.as_bytes())
        );

        let mut client_builder = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(config.timeout_seconds.min(30)));

        if !config.tls_verify {
            tracing::warn!(url = %config.url, "TLS certificate verification disabled");
            client_builder = client_builder.danger_accept_invalid_certs(true);
        }

        let client = client_builder.build().map_err(|e| {
            EtlError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            config,
            auth_header,
        })
    }

    fn map_request_error(err: reqwest::Error) -> SourceError {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else {
            SourceError::Connection(err.to_string())
        }
    }
}

#[async_trait]
impl RecordSource for SusClient {
    async fn fetch(&self) -> Result<RawResult> {
        tracing::info!(
            url = %self.config.url,
            size = ?self.config.query.size,
            "Querying immunization search API"
        );

        let mut request = self
            .client
            .get(&self.config.url)
            .header("Authorization", &self.auth_header);

        if let Some(size) = self.config.query.size {
            request = request.query(&[("size", size)]);
        }

        let response = request.send().await.map_err(|e| {
            let err = Self::map_request_error(e);
            tracing::error!(url = %self.config.url, error = %err, "Search request failed");
            err
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            tracing::error!(
                url = %self.config.url,
                status = status.as_u16(),
                "Search API rejected the request"
            );
            return Err(SourceError::AuthFailure {
                status: status.as_u16(),
                message,
            }
            .into());
        }

        let body = response
            .text()
            .await
            .map_err(Self::map_request_error)?;

        let value: serde_json::Value = serde_json::from_str(&body).map_err(|e| {
            SourceError::InvalidResponse(format!("Response body is not valid JSON: {e}"))
        })?;

        tracing::debug!(bytes = body.len(), "Search API response received");

        Ok(RawResult::new(value))
    }

    fn endpoint(&self) -> &str {
        &self.config.url
    }
}
