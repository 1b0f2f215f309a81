use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("Failed to read corpus '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Corpus '{path}' has no header line.")]
    MissingHeader { path: PathBuf },
    #[error("Cannot detect the format of corpus '{path}' from header '{header}'.")]
    UnknownFormat { path: PathBuf, header: String },
    #[error("Corpus '{path}' is missing column '{column}'.")]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error("Corpus '{path}' line {line}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },
    #[error("Journey datetime out of range (day {day}, second {second}).")]
    DatetimeOutOfRange { day: i64, second: i64 },
    #[error("Corpus '{path}' contains no requests.")]
    Empty { path: PathBuf },
}
