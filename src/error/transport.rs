use thiserror::Error;

/// A transport-level failure of one HTTP call.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Request timed out: {source}")]
    Timeout {
        #[source]
        source: reqwest::Error,
    },
    #[error("Connection failed: {message}")]
    Connection { message: String },
    #[error("Request failed: {source}")]
    Request {
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read response body: {source}")]
    Body {
        #[source]
        source: reqwest::Error,
    },
}

impl TransportError {
    #[must_use]
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout { source: err }
        } else if err.is_connect() {
            Self::Connection {
                message: err.to_string(),
            }
        } else if err.is_body() || err.is_decode() {
            Self::Body { source: err }
        } else {
            Self::Request { source: err }
        }
    }
}
