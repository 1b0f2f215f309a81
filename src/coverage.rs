//! Coverage metadata required before any request is dispatched.
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{AppError, AppResult, PreconditionError};

const START_DATE_FORMAT: &str = "%Y%m%d";

#[derive(Debug, Deserialize)]
struct CoverageResponse {
    #[serde(default)]
    regions: Vec<Region>,
}

#[derive(Debug, Deserialize)]
struct Region {
    start_production_date: Option<String>,
}

/// URL of the coverage metadata endpoint.
#[must_use]
pub fn coverage_url(server_url: &str, coverage: &str) -> String {
    format!("{}/coverage/{}", server_url.trim_end_matches('/'), coverage)
}

/// Fetches the start production date of `coverage`.
///
/// # Errors
///
/// Returns a [`PreconditionError`] when the endpoint is unreachable, answers
/// with a non-success status, or the payload has no usable start date.
pub async fn fetch_start_production_date(
    client: &Client,
    server_url: &str,
    coverage: &str,
) -> AppResult<NaiveDate> {
    let url = coverage_url(server_url, coverage);
    info!("Resolving coverage metadata from {}", url);

    let result = async {
        let response = client
            .get(&url)
            .send()
            .await
            .map_err(|err| PreconditionError::Request {
                url: url.clone(),
                source: err,
            })?;
        let status = response.status();
        if !status.is_success() {
            return Err(PreconditionError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }
        let body = response
            .text()
            .await
            .map_err(|err| PreconditionError::Request {
                url: url.clone(),
                source: err,
            })?;
        parse_start_production_date(&body, &url)
    }
    .await;

    match result {
        Ok(date) => {
            info!("Coverage {} starts production on {}", coverage, date);
            Ok(date)
        }
        Err(err) => {
            error!("Coverage precondition failed: {}", err);
            Err(AppError::precondition(err))
        }
    }
}

/// Extracts `regions[0].start_production_date` from a coverage payload.
///
/// # Errors
///
/// Returns an error when the payload is not JSON, has no region, or the date
/// is not formatted `%Y%m%d`.
pub fn parse_start_production_date(body: &str, url: &str) -> Result<NaiveDate, PreconditionError> {
    let payload: CoverageResponse =
        serde_json::from_str(body).map_err(|err| PreconditionError::Decode {
            url: url.to_owned(),
            source: err,
        })?;
    let raw = payload
        .regions
        .into_iter()
        .next()
        .and_then(|region| region.start_production_date)
        .ok_or_else(|| PreconditionError::MissingStartDate {
            url: url.to_owned(),
        })?;
    NaiveDate::parse_from_str(raw.trim(), START_DATE_FORMAT)
        .map_err(|err| PreconditionError::InvalidStartDate { value: raw, source: err })
}
