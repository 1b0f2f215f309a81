use std::time::Duration;

use reqwest::Client;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::error;

use crate::args::defaults::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, ConfigError};

/// Builds the HTTP client shared by the precondition check and every worker.
///
/// The auth token, when present, is sent as the `Authorization` header of
/// every request.
///
/// # Errors
///
/// Returns an error when the token is not a valid header value or the client
/// cannot be built.
pub fn build_client(
    token: Option<&str>,
    request_timeout: Duration,
    connect_timeout: Duration,
    pool_size: usize,
) -> AppResult<Client> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(token)
            .map_err(|_invalid| AppError::config(ConfigError::InvalidToken))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    Client::builder()
        .user_agent(DEFAULT_USER_AGENT)
        .default_headers(headers)
        .timeout(request_timeout)
        .connect_timeout(connect_timeout)
        .pool_max_idle_per_host(pool_size)
        .build()
        .map_err(|err| {
            error!("Failed to build HTTP client: {}", err);
            AppError::from(err)
        })
}
