//! Lofi HTTP Client
//!
//! Authenticated transport for the Lofi Maker processing service.
//!
//! The [`JobTransport`] trait is the seam the lifecycle controller depends on;
//! [`ServiceClient`] is its HTTP implementation. Every call performs exactly
//! one request and never retries: retry policy belongs to the caller.
//!
//! # Example
//!
//! ```no_run
//! use lofi_client::{JobTransport, ServiceClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = ServiceClient::new("http://localhost:8000", "secret-token");
//!
//!     for job in client.list_jobs().await? {
//!         println!("{} {}", job.id, job.status());
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;
mod outputs;
pub mod transport;

// Re-export commonly used types
pub use error::{Result, TransportError};
pub use transport::JobTransport;

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the processing service API
///
/// Endpoints are grouped into:
/// - Jobs (list, status, create)
/// - Outputs (download, listing of rendered files)
#[derive(Debug, Clone)]
pub struct ServiceClient {
    /// Base URL of the service (e.g., "http://localhost:8000")
    base_url: String,
    /// Bearer token attached to every request
    token: String,
    /// HTTP client instance
    client: Client,
}

impl ServiceClient {
    /// Create a new service client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the service
    /// * `token` - Bearer credential sent with every request
    ///
    /// # Example
    /// ```
    /// use lofi_client::ServiceClient;
    ///
    /// let client = ServiceClient::new("http://localhost:8000", "secret-token");
    /// ```
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new service client with a custom HTTP client
    ///
    /// This allows you to configure timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use lofi_client::ServiceClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = ServiceClient::with_client("http://localhost:8000", "secret-token", http_client);
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Public link to a rendered video
    pub fn download_url(&self, locator: &str) -> String {
        match self.endpoint(&["download", locator]) {
            Ok(url) => url.into(),
            Err(_) => format!("{}/download/{}", self.base_url, locator),
        }
    }

    /// Endpoint URL under the base URL
    ///
    /// Each segment is percent-encoded, so ids and file names containing
    /// `/`, `?` or `#` stay a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    fn get(&self, url: Url) -> RequestBuilder {
        self.client.get(url).bearer_auth(&self.token)
    }

    fn post(&self, url: Url) -> RequestBuilder {
        self.client.post(url).bearer_auth(&self.token)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize JSON
    ///
    /// Non-success status codes become [`TransportError::Api`] carrying the body.
    async fn handle_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let response = Self::check_status(response).await?;

        response
            .json()
            .await
            .map_err(|e| TransportError::Parse(format!("Failed to parse JSON response: {}", e)))
    }

    /// Handle an API response carrying raw bytes
    async fn handle_bytes(&self, response: reqwest::Response) -> Result<Vec<u8>> {
        let response = Self::check_status(response).await?;

        Ok(response.bytes().await?.to_vec())
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::api_error(status.as_u16(), error_text));
        }

        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ServiceClient::new("http://localhost:8000", "token");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ServiceClient::new("http://localhost:8000/", "token");
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_download_url() {
        let client = ServiceClient::new("https://lofi.example.com/", "token");
        assert_eq!(
            client.download_url("job_1a2b_final.mp4"),
            "https://lofi.example.com/download/job_1a2b_final.mp4"
        );
    }

    #[test]
    fn test_download_url_encodes_locator() {
        let client = ServiceClient::new("https://lofi.example.com", "token");
        assert_eq!(
            client.download_url("my mix?v=2#a/b.mp4"),
            "https://lofi.example.com/download/my%20mix%3Fv=2%23a%2Fb.mp4"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = ServiceClient::new("http://localhost:8000/api/", "token");
        let url = client.endpoint(&["jobs", "J1"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/jobs/J1");
    }

    #[test]
    fn test_endpoint_rejects_relative_base() {
        let client = ServiceClient::new("localhost", "token");
        assert!(matches!(
            client.endpoint(&["jobs"]),
            Err(TransportError::InvalidUrl(_))
        ));
    }
}
