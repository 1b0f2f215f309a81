use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;

use crate::error::TransportError;

/// Performs the single HTTP call of one work unit.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Issues a GET to `url` and returns the response status once the body
    /// has been fully read.
    ///
    /// # Errors
    ///
    /// Returns an error when the connection, the request or the body read fails.
    async fn get(&self, url: &str) -> Result<u16, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest` connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    #[must_use]
    pub const fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<u16, TransportError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(TransportError::from_reqwest)?;
        let status = response.status().as_u16();
        drain_response_body(response)
            .await
            .map_err(TransportError::from_reqwest)?;
        Ok(status)
    }
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
