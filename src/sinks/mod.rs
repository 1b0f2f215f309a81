//! Per-scenario result files.
mod records;
mod writer;


pub use records::{ScenarioRecord, parse_scenario_rows, read_scenario_file};
pub use writer::ResultSink;

/// Header line of every scenario result file.
pub const SCENARIO_FILE_HEADER: &str = "No,url,elapsed time,status_code";
