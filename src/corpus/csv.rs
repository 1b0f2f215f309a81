use std::path::Path;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use tracing::{debug, info};

use crate::args::InputFormat;
use crate::error::{AppError, AppResult, CorpusError};

use super::{DATETIME_FORMAT, JOURNEYS_PATH, RequestCorpus};

/// Column positions of the legacy journeys export.
struct JourneyColumns {
    start: usize,
    target: usize,
    day: usize,
    hour: usize,
    arrival: Option<usize>,
}

/// Reads a corpus CSV file.
///
/// # Errors
///
/// Returns an error when the file cannot be read, its format cannot be
/// detected, a row is malformed, or it holds no requests.
pub async fn read_corpus_csv(
    path: &Path,
    format: InputFormat,
    start_date: NaiveDate,
) -> AppResult<RequestCorpus> {
    info!("Reading corpus {}", path.display());
    let content = tokio::fs::read_to_string(path).await.map_err(|err| {
        AppError::corpus(CorpusError::Read {
            path: path.to_path_buf(),
            source: err,
        })
    })?;
    let corpus = parse_corpus(&content, path, format, start_date)?;
    if corpus.is_empty() {
        return Err(AppError::corpus(CorpusError::Empty {
            path: path.to_path_buf(),
        }));
    }
    info!("Corpus {} holds {} requests", path.display(), corpus.len());
    Ok(corpus)
}

/// Parses corpus CSV content. `path` is only used in error messages.
///
/// # Errors
///
/// Returns an error when the header is missing or unknown, or a row is malformed.
pub fn parse_corpus(
    content: &str,
    path: &Path,
    format: InputFormat,
    start_date: NaiveDate,
) -> Result<RequestCorpus, CorpusError> {
    let mut lines = content
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx.saturating_add(1), line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header) = lines.next().ok_or_else(|| CorpusError::MissingHeader {
        path: path.to_path_buf(),
    })?;
    let columns: Vec<String> = header
        .split(',')
        .map(|column| column.trim().to_owned())
        .collect();

    let format = match format {
        InputFormat::Auto => detect_format(&columns).ok_or_else(|| CorpusError::UnknownFormat {
            path: path.to_path_buf(),
            header: header.to_owned(),
        })?,
        InputFormat::Requests | InputFormat::Journeys => format,
    };

    let mut pairs = Vec::new();
    match format {
        InputFormat::Journeys => {
            let layout = journey_columns(&columns, path)?;
            for (line_no, line) in lines {
                if let Some(pair) = parse_journey_row(line, line_no, &layout, path, start_date)? {
                    pairs.push(pair);
                }
            }
        }
        InputFormat::Requests | InputFormat::Auto => {
            for (line_no, line) in lines {
                pairs.push(parse_request_row(line, line_no, path)?);
            }
        }
    }

    Ok(RequestCorpus::from_pairs(pairs))
}

fn detect_format(columns: &[String]) -> Option<InputFormat> {
    let has = |name: &str| columns.iter().any(|column| column.eq_ignore_ascii_case(name));
    if has("path") {
        Some(InputFormat::Requests)
    } else if has("start") && has("target") {
        Some(InputFormat::Journeys)
    } else {
        None
    }
}

fn journey_columns(columns: &[String], path: &Path) -> Result<JourneyColumns, CorpusError> {
    let find = |name: &'static str| {
        columns
            .iter()
            .position(|column| column.eq_ignore_ascii_case(name))
    };
    let require = |name: &'static str| {
        find(name).ok_or_else(|| CorpusError::MissingColumn {
            path: path.to_path_buf(),
            column: name,
        })
    };
    Ok(JourneyColumns {
        start: require("Start")?,
        target: require("Target")?,
        day: require("Day")?,
        hour: require("Hour")?,
        arrival: find("arrival"),
    })
}

fn parse_request_row(
    line: &str,
    line_no: usize,
    path: &Path,
) -> Result<(String, String), CorpusError> {
    let (request_path, parameters) = line.split_once(',').unwrap_or((line, ""));
    let request_path = request_path.trim();
    if request_path.is_empty() {
        return Err(CorpusError::MalformedRow {
            path: path.to_path_buf(),
            line: line_no,
            reason: "empty path".to_owned(),
        });
    }
    Ok((request_path.to_owned(), parameters.trim().to_owned()))
}

fn parse_journey_row(
    line: &str,
    line_no: usize,
    layout: &JourneyColumns,
    path: &Path,
    start_date: NaiveDate,
) -> Result<Option<(String, String)>, CorpusError> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let malformed = |reason: String| CorpusError::MalformedRow {
        path: path.to_path_buf(),
        line: line_no,
        reason,
    };
    let field = |position: usize, name: &str| {
        fields
            .get(position)
            .copied()
            .ok_or_else(|| malformed(format!("missing {}", name)))
    };

    if let Some(arrival) = layout.arrival
        && field(arrival, "arrival")? == "-1"
    {
        debug!("Skipping unreachable journey on line {}", line_no);
        return Ok(None);
    }

    let from = field(layout.start, "Start")?;
    let to = field(layout.target, "Target")?;
    let day: i64 = field(layout.day, "Day")?
        .parse()
        .map_err(|err| malformed(format!("invalid Day: {}", err)))?;
    let second: i64 = field(layout.hour, "Hour")?
        .parse()
        .map_err(|err| malformed(format!("invalid Hour: {}", err)))?;
    if from.is_empty() || to.is_empty() {
        return Err(malformed("empty Start or Target".to_owned()));
    }

    let datetime = journey_datetime(start_date, day, second)?;
    Ok(Some((
        JOURNEYS_PATH.to_owned(),
        format!("from={}&to={}&datetime={}", from, to, datetime),
    )))
}

/// Formats `start_date + day days + second seconds` as a query datetime.
///
/// # Errors
///
/// Returns an error when the offset overflows the calendar.
pub(crate) fn journey_datetime(
    start_date: NaiveDate,
    day: i64,
    second: i64,
) -> Result<String, CorpusError> {
    let out_of_range = || CorpusError::DatetimeOutOfRange { day, second };
    let days = TimeDelta::try_days(day).ok_or_else(out_of_range)?;
    let seconds = TimeDelta::try_seconds(second).ok_or_else(out_of_range)?;
    let datetime = start_date
        .and_time(NaiveTime::MIN)
        .checked_add_signed(days)
        .and_then(|value| value.checked_add_signed(seconds))
        .ok_or_else(out_of_range)?;
    Ok(datetime.format(DATETIME_FORMAT).to_string())
}
