use thiserror::Error;

/// Failures resolving upstream metadata before any request is dispatched.
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("Coverage request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Coverage request to '{url}' returned status {status}.")]
    Status { url: String, status: u16 },
    #[error("Coverage response from '{url}' is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Coverage response from '{url}' has no regions[0].start_production_date.")]
    MissingStartDate { url: String },
    #[error("Invalid start_production_date '{value}': {source}")]
    InvalidStartDate {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
