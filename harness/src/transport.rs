//! Transport seam for dispatching TRAPI queries.
//!
//! Implementations normalize every failure into a status/body pair: a call
//! that never produced an HTTP response reports status 0 with no body. The
//! run pipeline only ever branches on that pair, so no transport error type
//! crosses this boundary.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

/// Per-request timeout applied when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Normalized outcome of one TRAPI call.
#[derive(Debug, Clone)]
pub struct TrapiCall {
    /// HTTP status code, or 0 when the call never produced a response.
    pub status: u16,
    /// Decoded JSON body, when one was returned.
    pub body: Option<Value>,
}

/// Dispatches TRAPI queries to service endpoints.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Posts a query to the endpoint's `/query` route and returns the
    /// normalized outcome.
    async fn execute(&self, endpoint: &str, query: &Value) -> TrapiCall;
}

/// Transport backed by a shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] when the HTTP client
    /// cannot be constructed (for example, when TLS backend initialization
    /// fails).
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_timeout(DEFAULT_REQUEST_TIMEOUT)
    }

    /// Creates a transport with the given per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`reqwest::Error`] when the HTTP client
    /// cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, endpoint: &str, query: &Value) -> TrapiCall {
        let url = format!("{}/query", endpoint.trim_end_matches('/'));
        tracing::debug!(%url, "dispatching TRAPI query");
        let response = match self.client.post(&url).json(query).send().await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%url, %error, "TRAPI call failed before a response arrived");
                return TrapiCall {
                    status: 0,
                    body: None,
                };
            }
        };
        let status = response.status().as_u16();
        match response.json::<Value>().await {
            Ok(body) => TrapiCall {
                status,
                body: Some(body),
            },
            Err(error) => {
                tracing::warn!(%url, status, %error, "TRAPI response body was not JSON");
                TrapiCall { status, body: None }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio::sync::Mutex;

    use super::*;

    /// Transport that answers every call with one canned outcome, recording
    /// each dispatched (endpoint, query) pair.
    pub(crate) struct CannedTransport {
        outcome: TrapiCall,
        requests: Mutex<Vec<(String, Value)>>,
    }

    impl CannedTransport {
        pub(crate) fn returning(status: u16, body: Option<Value>) -> Self {
            Self {
                outcome: TrapiCall { status, body },
                requests: Mutex::new(Vec::new()),
            }
        }

        pub(crate) async fn requests(&self) -> Vec<(String, Value)> {
            self.requests.lock().await.clone()
        }

        pub(crate) async fn request_count(&self) -> usize {
            self.requests.lock().await.len()
        }
    }

    #[async_trait]
    impl Transport for CannedTransport {
        async fn execute(&self, endpoint: &str, query: &Value) -> TrapiCall {
            self.requests
                .lock()
                .await
                .push((endpoint.to_string(), query.clone()));
            self.outcome.clone()
        }
    }
}
