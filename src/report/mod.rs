//! Comparison of scenario latency series against the baseline scenario.
mod chart;
mod summary;


use tracing::{error, info};

use crate::config::ReportConfig;
use crate::error::AppResult;

pub use chart::plot_latency_comparison;
pub use summary::{
    Comparison, ComparisonReport, LatencyStats, ScenarioSeries, ScenarioSummary, Verdict,
};

/// Prints the comparison of `series` (first = baseline) and renders the
/// chart when enabled.
///
/// # Errors
///
/// Returns an error when the statistics cannot be computed or the chart
/// cannot be drawn.
pub fn render_report(series: &[ScenarioSeries], config: &ReportConfig) -> AppResult<ComparisonReport> {
    let report = ComparisonReport::build(series, config.regression_threshold)?;
    for line in report.lines() {
        println!("{}", line);
    }

    match config.chart_path.as_deref() {
        Some(path) => {
            if let Err(err) = plot_latency_comparison(series, path) {
                error!("Failed to render chart {}: {}", path.display(), err);
                return Err(err);
            }
            println!("Charts: saved in {}", path.display());
        }
        None => {
            info!("Chart rendering disabled");
            println!("Charts: disabled");
        }
    }
    Ok(report)
}
