use std::time::Duration;

use supplier_feed::{FeedFetcher, FetchError, FetchedBody};

use crate::retry::RetryPolicy;

/// Per-request timeout applied to every attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for supplier JSON endpoints.
///
/// Sends `GET` with `Accept: application/json` and an optional bearer
/// token. Transient failures are retried according to the [`RetryPolicy`];
/// the body is returned undecoded.
pub struct EndpointClient {
    client: reqwest::Client,
    policy: RetryPolicy,
    timeout: Duration,
}

impl EndpointClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            policy: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn fetch_once(&self, url: &str, token: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let mut req = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .header("User-Agent", "supplier-feed")
            .timeout(self.timeout);

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let response = req
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(format!("failed to read response body: {e}")))?;

        Ok(bytes.to_vec())
    }
}

impl Default for EndpointClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl FeedFetcher for EndpointClient {
    async fn fetch(&self, url: &str, token: Option<&str>) -> Result<FetchedBody, FetchError> {
        let bytes = self
            .policy
            .run(move |attempt| {
                tracing::debug!(url, attempt, "requesting supplier endpoint");
                self.fetch_once(url, token)
            })
            .await?;

        Ok(FetchedBody { bytes })
    }
}
