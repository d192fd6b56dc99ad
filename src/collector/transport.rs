use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client};
use thiserror::Error;
use tracing::debug;

/// Per-request socket timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// What came back from one GET, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// Raw `Retry-After` header, if present
    pub retry_after: Option<String>,
    pub body: String,
}

/// Failures below the HTTP layer. All of them are retried with backoff.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// Anything that can issue a GET for a match endpoint.
#[async_trait]
pub trait MatchTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<HttpReply, TransportError>;
}

/// `reqwest`-backed transport with a 10-second timeout.
#[derive(Clone)]
pub struct HttpTransport {
    http: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("esports-collector/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpTransport { http })
    }
}

#[async_trait]
impl MatchTransport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        headers: &[(&'static str, String)],
    ) -> Result<HttpReply, TransportError> {
        debug!("GET {}", url);

        let mut req = self.http.get(url);
        for (name, value) in headers {
            req = req.header(*name, value);
        }
        let resp = req.send().await?;

        let status = resp.status().as_u16();
        let retry_after = resp
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.text().await?;

        Ok(HttpReply {
            status,
            retry_after,
            body,
        })
    }
}
