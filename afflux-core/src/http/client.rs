//! HTTP probe client trait and implementations.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProbeError;

/// The HTTP status returned by a reachability probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStatus(pub u16);

impl ProbeStatus {
    pub fn is_success(self) -> bool {
        (200..300).contains(&self.0)
    }
}

/// Trait for issuing reachability probes, enabling mockability in tests.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Issue a HEAD request and return the response status. Redirects are
    /// followed; the status is the one at the end of the chain.
    async fn head(&self, url: &str) -> Result<ProbeStatus, ProbeError>;
}

/// Configuration for [`ProbeClient`].
#[derive(Clone)]
pub struct ProbeClientBuilder {
    timeout: Duration,
    user_agent: String,
}

impl Default for ProbeClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ProbeClientBuilder {
    pub fn new() -> Self {
        Self {
            // Probes are HEAD-only; anything slower than this is as good as
            // broken for our purposes.
            timeout: Duration::from_secs(10),
            user_agent: "Mozilla/5.0 (compatible; Afflux/1.0; +https://afflux.dev)".to_string(),
        }
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: String) -> Self {
        self.user_agent = user_agent;
        self
    }

    /// Build the ProbeClient.
    pub fn build(self) -> Result<ProbeClient, reqwest::Error> {
        let inner = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .build()?;
        Ok(ProbeClient { inner })
    }
}

/// Production probe client backed by reqwest.
pub struct ProbeClient {
    inner: reqwest::Client,
}

impl ProbeClient {
    pub fn new() -> Result<Self, reqwest::Error> {
        ProbeClientBuilder::new().build()
    }

    pub fn builder() -> ProbeClientBuilder {
        ProbeClientBuilder::new()
    }
}

#[async_trait]
impl HttpClient for ProbeClient {
    async fn head(&self, url: &str) -> Result<ProbeStatus, ProbeError> {
        let parsed =
            reqwest::Url::parse(url).map_err(|e| ProbeError::InvalidUrl(e.to_string()))?;
        let response = self.inner.head(parsed).send().await?;
        let status = response.status().as_u16();
        tracing::debug!(url, status, "probe");
        Ok(ProbeStatus(status))
    }
}

/// Canned probe response for testing.
#[derive(Clone)]
enum MockResponse {
    Status(u16),
    Error(String),
}

/// Mock probe client for testing.
#[derive(Default)]
pub struct MockClient {
    responses: HashMap<String, MockResponse>,
    default_status: Option<u16>,
}

impl MockClient {
    /// Create a new empty mock client. Probing an unregistered URL fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer probes for `url` with the given status code.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), MockResponse::Status(status));
        self
    }

    /// Answer probes for `url` with a transport-level error.
    pub fn with_error(mut self, url: &str, error: &str) -> Self {
        self.responses
            .insert(url.to_string(), MockResponse::Error(error.to_string()));
        self
    }

    /// Answer probes for unregistered URLs with the given status code.
    pub fn with_default_status(mut self, status: u16) -> Self {
        self.default_status = Some(status);
        self
    }
}

#[async_trait]
impl HttpClient for MockClient {
    async fn head(&self, url: &str) -> Result<ProbeStatus, ProbeError> {
        match self.responses.get(url) {
            Some(MockResponse::Status(status)) => Ok(ProbeStatus(*status)),
            Some(MockResponse::Error(error)) => Err(ProbeError::Unreachable(error.clone())),
            None => match self.default_status {
                Some(status) => Ok(ProbeStatus(status)),
                None => Err(ProbeError::Unreachable(format!(
                    "No mock response for URL: {}",
                    url
                ))),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_client_returns_registered_status() {
        let client = MockClient::new().with_status("https://a.test/img.jpg", 404);
        let status = client.head("https://a.test/img.jpg").await.unwrap();
        assert_eq!(status, ProbeStatus(404));
        assert!(!status.is_success());
    }

    #[tokio::test]
    async fn mock_client_falls_back_to_default() {
        let client = MockClient::new().with_default_status(200);
        assert!(client.head("https://b.test/x").await.unwrap().is_success());
    }

    #[tokio::test]
    async fn mock_client_errors_on_unknown_url() {
        let client = MockClient::new();
        assert!(client.head("https://c.test/x").await.is_err());
    }
}
