use std::path::Path;

use plotters::prelude::*;
use tracing::info;

use super::summary::ScenarioSeries;
use crate::error::{AppError, AppResult, ReportError};

const CHART_SIZE: (u32, u32) = (1600, 600);

/// Draws one latency line per scenario against the request index.
///
/// # Errors
///
/// Returns an error when the output directory cannot be created or drawing
/// fails.
pub fn plot_latency_comparison(series: &[ScenarioSeries], path: &Path) -> AppResult<()> {
    let Some(points) = series.iter().map(|entry| entry.latencies.len()).max() else {
        return Ok(());
    };
    if points == 0 {
        info!("No requests to plot, skipping {}", path.display());
        return Ok(());
    }
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| {
            AppError::report(ReportError::ChartDir {
                path: parent.to_path_buf(),
                source: err,
            })
        })?;
    }

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let x_max = points.max(2);
    let y_max = series
        .iter()
        .flat_map(ScenarioSeries::plotted)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Latency per Request", ("sans-serif", 30).into_font())
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0usize..x_max, 0.0_f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Request index")
        .y_desc("Latency (ms)")
        .x_labels(20)
        .y_labels(10)
        .draw()?;

    for (position, entry) in series.iter().enumerate() {
        let color = Palette99::pick(position).to_rgba();
        chart
            .draw_series(LineSeries::new(entry.plotted().enumerate(), color))?
            .label(entry.name.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x.saturating_add(20), y)], color)
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!("Comparison chart saved to {}", path.display());
    Ok(())
}
