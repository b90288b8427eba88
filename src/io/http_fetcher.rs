use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode};

use super::Fetcher;
use crate::error::FetchError;

/// Upper bound on the TCP/TLS connect phase, independent of the request timeout.
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// reqwest-backed implementation of [`Fetcher`].
///
/// A single client is reused for the page and every tile so connections to
/// the tile host are kept alive across the whole grid.
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Wrap an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str) -> Result<Bytes, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| map_reqwest_error(url, e))?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.bytes().await.map_err(|e| map_reqwest_error(url, e))
    }
}

fn map_reqwest_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Connection(e.to_string())
    }
}

/// Create an HTTP client with an explicit request timeout and user agent.
///
/// ```ignore
/// let client = create_http_client(Duration::from_secs(30), "tile-stitcher/0.1.0")?;
/// let fetcher = HttpFetcher::new(client);
/// ```
pub fn create_http_client(timeout: Duration, user_agent: &str) -> Result<Client, FetchError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(user_agent)
        .build()
        .map_err(|e| FetchError::Connection(e.to_string()))
}
