use std::path::{Path, PathBuf};

use tracing::info;

use crate::args::ReplotArgs;
use crate::config::{ConfigFile, ReportConfig, TargetConfig, process_env, resolve_target_config};
use crate::error::{AppError, AppResult, ReportError};
use crate::report::{ComparisonReport, ScenarioSeries, render_report};
use crate::sinks::read_scenario_file;

/// Rebuilds the comparison report from previously written scenario files.
///
/// # Errors
///
/// Returns an error when the configuration is invalid, a file cannot be read
/// or the report cannot be rendered.
pub async fn run_replot(args: &ReplotArgs, file: Option<&ConfigFile>) -> AppResult<()> {
    let target = resolve_target_config(&args.target, file, &process_env)?;
    let paths = replot_paths(&args.files, &target);
    replot_files(&paths, &target.report).await.map(|_report| ())
}

/// Reads each file as one scenario, the first being the baseline, and
/// renders their comparison.
///
/// # Errors
///
/// Returns an error when a file cannot be read or the report cannot be
/// rendered.
pub async fn replot_files(paths: &[PathBuf], report: &ReportConfig) -> AppResult<ComparisonReport> {
    let mut series = Vec::with_capacity(paths.len());
    for path in paths {
        let name = scenario_name_from_path(path)?;
        let records = read_scenario_file(path).await?;
        info!("Read {} rows for {} from {}", records.len(), name, path.display());
        series.push(ScenarioSeries::from_records(name, &records));
    }

    render_report(&series, report)
}

/// Explicit files in the given order, else one file per configured scenario.
pub(crate) fn replot_paths(files: &[String], target: &TargetConfig) -> Vec<PathBuf> {
    if files.is_empty() {
        target
            .scenarios
            .iter()
            .map(|scenario| target.scenario_path(scenario))
            .collect()
    } else {
        files.iter().map(PathBuf::from).collect()
    }
}

/// Scenario name of a result file: its stem.
pub(crate) fn scenario_name_from_path(path: &Path) -> AppResult<String> {
    path.file_stem()
        .and_then(|stem| stem.to_str())
        .filter(|stem| !stem.is_empty())
        .map(str::to_owned)
        .ok_or_else(|| {
            AppError::report(ReportError::InvalidFileName {
                path: path.to_path_buf(),
            })
        })
}
