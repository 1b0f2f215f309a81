use std::path::{Path, PathBuf};

use super::SCENARIO_FILE_HEADER;
use crate::error::ReportError;

/// One data row of a scenario result file.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioRecord {
    pub index: usize,
    pub url: String,
    pub elapsed_ms: f64,
    pub status_code: u16,
}

/// Reads a scenario result file, sorted by index.
///
/// # Errors
///
/// Returns an error when the file cannot be read or a row is malformed.
pub async fn read_scenario_file(path: &Path) -> Result<Vec<ScenarioRecord>, ReportError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|err| ReportError::Read {
            path: path.to_path_buf(),
            source: err,
        })?;
    parse_scenario_rows(&content, path)
}

/// Parses the content of a scenario result file.
///
/// The url column may contain commas: the index is taken from the left and
/// the status and elapsed columns from the right.
///
/// # Errors
///
/// Returns [`ReportError::MalformedRow`] with the 1-based line number of the
/// first row that cannot be parsed.
pub fn parse_scenario_rows(content: &str, path: &Path) -> Result<Vec<ScenarioRecord>, ReportError> {
    let mut records = Vec::new();
    for (number, line) in (1usize..).zip(content.lines()) {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || (number == 1 && line.trim() == SCENARIO_FILE_HEADER) {
            continue;
        }
        let record = parse_row(line).ok_or_else(|| ReportError::MalformedRow {
            path: PathBuf::from(path),
            line: number,
        })?;
        records.push(record);
    }
    records.sort_by_key(|record| record.index);
    Ok(records)
}

fn parse_row(line: &str) -> Option<ScenarioRecord> {
    let (index, rest) = line.split_once(',')?;
    let mut columns = rest.rsplitn(3, ',');
    let status_code = columns.next()?.trim().parse().ok()?;
    let elapsed_ms: f64 = columns.next()?.trim().parse().ok()?;
    let url = columns.next()?;
    if !elapsed_ms.is_finite() || elapsed_ms < 0.0 {
        return None;
    }
    Some(ScenarioRecord {
        index: index.trim().parse().ok()?,
        url: url.to_owned(),
        elapsed_ms,
        status_code,
    })
}
