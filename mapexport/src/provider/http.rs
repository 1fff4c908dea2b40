//! HTTP client abstraction for testability

use super::types::ProviderError;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default User-Agent string for HTTP requests.
///
/// The OpenStreetMap tile usage policy requires an identifying User-Agent.
pub const DEFAULT_USER_AGENT: &str = concat!("mapexport/", env!("CARGO_PKG_VERSION"));

/// Trait for asynchronous HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an async HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    ///
    /// # Returns
    ///
    /// The response body as bytes, or an error for transport failures and
    /// non-success statuses.
    fn get(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ProviderError>> + Send;
}

/// Async HTTP client implementation using reqwest.
#[derive(Clone)]
pub struct AsyncReqwestClient {
    client: reqwest::Client,
}

impl AsyncReqwestClient {
    /// Creates a new AsyncReqwestClient with default configuration.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_options(Duration::from_secs(30), DEFAULT_USER_AGENT)
    }

    /// Creates a new AsyncReqwestClient with a custom timeout and User-Agent.
    pub fn with_options(timeout: Duration, user_agent: &str) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            // One export hits a single host with many small requests
            .pool_max_idle_per_host(32)
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_nodelay(true)
            .build()
            .map_err(|e| {
                ProviderError::HttpError(format!("Failed to create async HTTP client: {}", e))
            })?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for AsyncReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        trace!(url = url, "HTTP GET request starting");

        let response = match self.client.get(url).send().await {
            Ok(resp) => {
                debug!(
                    url = url,
                    status = resp.status().as_u16(),
                    "HTTP response received"
                );
                resp
            }
            Err(e) => {
                warn!(
                    url = url,
                    error = %e,
                    is_connect = e.is_connect(),
                    is_timeout = e.is_timeout(),
                    "HTTP request failed"
                );
                return Err(ProviderError::HttpError(format!("Request failed: {}", e)));
            }
        };

        // Check HTTP status
        if !response.status().is_success() {
            warn!(
                url = url,
                status = response.status().as_u16(),
                "HTTP error status"
            );
            return Err(ProviderError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        match response.bytes().await {
            Ok(bytes) => {
                trace!(url = url, bytes = bytes.len(), "HTTP response body read");
                Ok(bytes.to_vec())
            }
            Err(e) => {
                warn!(url = url, error = %e, "Failed to read response body");
                Err(ProviderError::HttpError(format!(
                    "Failed to read response: {}",
                    e
                )))
            }
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Mock async HTTP client for testing.
    ///
    /// Answers every URL with `response` unless `overrides` has an entry for
    /// it. Counts the requests it receives.
    #[derive(Clone)]
    pub struct MockAsyncHttpClient {
        pub response: Result<Vec<u8>, ProviderError>,
        pub overrides: HashMap<String, Result<Vec<u8>, ProviderError>>,
        pub delay: Option<Duration>,
        requests: Arc<AtomicUsize>,
    }

    impl MockAsyncHttpClient {
        pub fn new(response: Result<Vec<u8>, ProviderError>) -> Self {
            Self {
                response,
                overrides: HashMap::new(),
                delay: None,
                requests: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn with_override(
            mut self,
            url: impl Into<String>,
            response: Result<Vec<u8>, ProviderError>,
        ) -> Self {
            self.overrides.insert(url.into(), response);
            self
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Number of GET requests made so far, across all clones.
        pub fn request_count(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }
    }

    impl AsyncHttpClient for MockAsyncHttpClient {
        async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.overrides
                .get(url)
                .cloned()
                .unwrap_or_else(|| self.response.clone())
        }
    }

    #[tokio::test]
    async fn test_mock_client_success() {
        let mock = MockAsyncHttpClient::new(Ok(vec![1, 2, 3, 4]));

        let result = mock.get("http://example.com").await;
        assert_eq!(result, Ok(vec![1, 2, 3, 4]));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_client_override() {
        let mock = MockAsyncHttpClient::new(Ok(vec![1])).with_override(
            "http://example.com/missing",
            Err(ProviderError::HttpError("Test error".to_string())),
        );

        assert!(mock.get("http://example.com/missing").await.is_err());
        assert!(mock.get("http://example.com/present").await.is_ok());
        assert_eq!(mock.clone().request_count(), 2);
    }

    #[test]
    fn test_reqwest_client_builds() {
        assert!(AsyncReqwestClient::with_options(Duration::from_secs(5), DEFAULT_USER_AGENT).is_ok());
    }
}
