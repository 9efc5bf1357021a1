//! HTTP client abstraction for testability

use std::time::Duration;

use thiserror::Error;

/// Errors from a single HTTP request.
#[derive(Debug, Clone, Error)]
pub enum HttpError {
    /// The server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The requested URL.
        url: String,
    },

    /// The request exceeded the configured per-request timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Connection, TLS, or protocol failure.
    #[error("transport error: {0}")]
    Transport(String),

    /// The client itself could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Setup(String),
}

impl HttpError {
    /// The HTTP status code, when the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Trait for asynchronous HTTP GET operations.
///
/// This abstraction allows for dependency injection and easier testing by
/// enabling mock HTTP clients in tests. Timeouts are the implementation's
/// responsibility and apply per request, never globally.
pub trait AsyncHttpClient: Send + Sync {
    /// Performs an HTTP GET request, returning the response body as bytes.
    fn get(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, HttpError>> + Send;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a new client with a per-request timeout and user agent.
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| HttpError::Setup(e.to_string()))?;

        Ok(Self { client })
    }
}

impl AsyncHttpClient for ReqwestClient {
    async fn get(&self, url: &str) -> Result<Vec<u8>, HttpError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                HttpError::Timeout(url.to_string())
            } else {
                HttpError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(HttpError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| HttpError::Transport(e.to_string()))
    }
}
