//! HTTP transport abstraction for testability

use std::future::Future;
use std::time::Duration;

use super::error::FetchError;

/// User-Agent sent with every request.
const USER_AGENT: &str = concat!("isstrack/", env!("CARGO_PKG_VERSION"));

/// A raw HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses.
    #[inline]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for the asynchronous GET the fetcher needs.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock transports in tests. Implementations report non-2xx
/// responses as `Ok` with the status; only transport-level failures are `Err`.
pub trait HttpTransport: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `timeout` - Upper bound for the whole request
    fn get(
        &self,
        url: &str,
        timeout: Duration,
    ) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// Transport implementation using reqwest.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a new transport with a pooled client.
    pub fn new() -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| FetchError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("Cache-Control", "no-cache")
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::trace!(url, status, bytes = body.len(), "HTTP response received");

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}
