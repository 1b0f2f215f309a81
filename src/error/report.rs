use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to read scenario file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Scenario file '{path}' line {line} is malformed.")]
    MalformedRow { path: PathBuf, line: usize },
    #[error("Scenario file '{path}' has no usable file name.")]
    InvalidFileName { path: PathBuf },
    #[error("Nothing to compare: no scenario series were provided.")]
    NoSeries,
    #[error("Histogram error: {message}")]
    Histogram { message: String },
    #[error("Failed to create chart directory '{path}': {source}")]
    ChartDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
