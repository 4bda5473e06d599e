//! HTTP client for the Amplitude Export API
//!
//! `GET <export_url>?start=YYYYMMDDTHH&end=YYYYMMDDTHH` with HTTP basic auth
//! (API key as user, secret key as password). The response body is a zip
//! archive.

use crate::config::AmplitudeConfig;
use crate::domain::{AmpsyncError, ExportError, Result, TimeWindow};
use base64::{engine::general_purpose, Engine as _};
use bytes::Bytes;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, ClientBuilder};
use secrecy::ExposeSecret;
use std::time::Duration;

/// Longest error body kept in an error message
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Export API client
///
/// # Example
///
/// ```no_run
/// use ampsync::adapters::amplitude::AmplitudeClient;
/// use ampsync::config::{secret_string, AmplitudeConfig};
/// use ampsync::domain::TimeWindow;
///
/// # async fn example() -> ampsync::domain::Result<()> {
/// let config = AmplitudeConfig {
///     api_key: Some("api-key".to_string()),
///     secret_key: Some(secret_string("secret-key".to_string())),
///     ..Default::default()
/// };
/// let client = AmplitudeClient::new(&config)?;
/// let window = TimeWindow::parse("20240101T00", "20240101T23")?;
/// let archive = client.fetch_export(&window).await?;
/// println!("{} bytes", archive.len());
/// # Ok(())
/// # }
/// ```
pub struct AmplitudeClient {
    client: Client,
    export_url: String,
    auth_header: String,
}

impl AmplitudeClient {
    /// Build a client from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a key is missing or the HTTP client
    /// cannot be built.
    pub fn new(config: &AmplitudeConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or_else(|| AmpsyncError::Configuration("amplitude.api_key is not set".into()))?;
        let secret_key = config
            .secret_key
            .as_ref()
            .ok_or_else(|| AmpsyncError::Configuration("amplitude.secret_key is not set".into()))?;

        let client = ClientBuilder::new()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                AmpsyncError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        let secret_key: &str = secret_key.expose_secret().as_ref();
        let credentials = format!("{api_key}:{secret_key}");
        let encoded = general_purpose::STANDARD.encode(credentials.as_bytes());

        Ok(Self {
            client,
            export_url: config.export_url.clone(),
            auth_header: format!("Basic {encoded}"),
        })
    }

    /// Endpoint this client talks to
    pub fn export_url(&self) -> &str {
        &self.export_url
    }

    /// Perform a single export request and return the full response body
    ///
    /// # Errors
    ///
    /// [`ExportError::RequestFailed`] on transport failures and
    /// [`ExportError::HttpStatus`] on non-success responses.
    pub async fn fetch_export(
        &self,
        window: &TimeWindow,
    ) -> std::result::Result<Bytes, ExportError> {
        let start = window.start_label();
        let end = window.end_label();

        tracing::debug!(url = %self.export_url, %start, %end, "Requesting export");

        let response = self
            .client
            .get(&self.export_url)
            .query(&[("start", start.as_str()), ("end", end.as_str())])
            .header(AUTHORIZATION, &self.auth_header)
            .send()
            .await
            .map_err(|e| ExportError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(ExportError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        response
            .bytes()
            .await
            .map_err(|e| ExportError::RequestFailed(format!("failed to read body: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;

    fn config_for(url: String) -> AmplitudeConfig {
        AmplitudeConfig {
            export_url: url,
            api_key: Some("user".to_string()),
            secret_key: Some(secret_string("pass".to_string())),
            timeout_seconds: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_requires_keys() {
        let config = AmplitudeConfig::default();
        assert!(matches!(
            AmplitudeClient::new(&config),
            Err(AmpsyncError::Configuration(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_sends_window_and_basic_auth() {
        let mut server = mockito::Server::new_async().await;
        // base64("user:pass")
        let mock = server
            .mock("GET", "/api/2/export")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("start".into(), "20240101T00".into()),
                mockito::Matcher::UrlEncoded("end".into(), "20240101T23".into()),
            ]))
            .match_header("authorization", "Basic dXNlcjpwYXNz")
            .with_status(200)
            .with_body("zip-bytes")
            .create_async()
            .await;

        let client = AmplitudeClient::new(&config_for(format!("{}/api/2/export", server.url())))
            .unwrap();
        let window = TimeWindow::parse("20240101T00", "20240101T23").unwrap();

        let body = client.fetch_export(&window).await.unwrap();
        assert_eq!(&body[..], b"zip-bytes");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_maps_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/2/export")
            .match_query(mockito::Matcher::Any)
            .with_status(429)
            .with_body("too many requests")
            .create_async()
            .await;

        let client = AmplitudeClient::new(&config_for(format!("{}/api/2/export", server.url())))
            .unwrap();
        let window = TimeWindow::parse("20240101T00", "20240101T23").unwrap();

        match client.fetch_export(&window).await {
            Err(ExportError::HttpStatus { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "too many requests");
            }
            other => panic!("expected HttpStatus error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_maps_transport_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let client = AmplitudeClient::new(&config_for("http://127.0.0.1:9/export".to_string()))
            .unwrap();
        let window = TimeWindow::parse("20240101T00", "20240101T23").unwrap();

        assert!(matches!(
            client.fetch_export(&window).await,
            Err(ExportError::RequestFailed(_))
        ));
    }
}
