//! Routing query corpus: typed requests built from CSV files or sampling.
mod csv;
mod sample;


use std::path::PathBuf;

use chrono::NaiveDate;

use crate::args::{BoundingBox, InputFormat, PositiveUsize};
use crate::error::AppResult;

pub use csv::{parse_corpus, read_corpus_csv};
pub use sample::sample_corpus;

/// Format of journey datetimes in query strings.
pub(crate) const DATETIME_FORMAT: &str = "%Y%m%dT%H%M%S";
/// Path of the journey planner endpoint under a coverage.
pub(crate) const JOURNEYS_PATH: &str = "journeys";

/// One routing query. Immutable once the corpus is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    index: usize,
    path: String,
    parameters: String,
}

impl Request {
    #[must_use]
    pub const fn new(index: usize, path: String, parameters: String) -> Self {
        Self {
            index,
            path,
            parameters,
        }
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn parameters(&self) -> &str {
        &self.parameters
    }
}

/// Ordered list of requests; indices are `0..len` in corpus order.
#[derive(Debug, Clone, Default)]
pub struct RequestCorpus {
    requests: Vec<Request>,
}

impl RequestCorpus {
    /// Builds a corpus from `(path, parameters)` pairs, numbering them in order.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let requests = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (path, parameters))| Request::new(index, path, parameters))
            .collect();
        Self { requests }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Request> {
        self.requests.iter()
    }
}

impl<'corpus> IntoIterator for &'corpus RequestCorpus {
    type Item = &'corpus Request;
    type IntoIter = std::slice::Iter<'corpus, Request>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.iter()
    }
}

/// Where the corpus of a `bench` run comes from.
#[derive(Debug, Clone)]
pub enum CorpusSource {
    Csv {
        path: PathBuf,
        format: InputFormat,
    },
    Sample {
        bbox: BoundingBox,
        count: PositiveUsize,
        seed: Option<u64>,
    },
}

/// Builds the corpus described by `source`.
///
/// `start_date` is the coverage start production date; journey datetimes are
/// expressed relative to it.
///
/// # Errors
///
/// Returns an error when the CSV cannot be read or contains malformed rows.
pub async fn load_corpus(source: &CorpusSource, start_date: NaiveDate) -> AppResult<RequestCorpus> {
    match source {
        CorpusSource::Csv { path, format } => read_corpus_csv(path, *format, start_date).await,
        CorpusSource::Sample { bbox, count, seed } => {
            Ok(sample_corpus(bbox, *count, *seed, start_date))
        }
    }
}
