use std::sync::Arc;

use tracing::{error, info};

use crate::args::RunArgs;
use crate::config::{BenchConfig, ConfigFile, process_env, resolve_bench_config};
use crate::corpus::load_corpus;
use crate::coverage::fetch_start_production_date;
use crate::dispatch::Dispatcher;
use crate::error::{AppError, AppResult, SinkError};
use crate::http::{HttpTransport, build_client};
use crate::report::{ScenarioSeries, render_report};
use crate::scenario::{ScenarioReport, ScenarioRunner};

/// Resolves the `bench` configuration from the process environment and runs it.
///
/// # Errors
///
/// Returns an error when the configuration is invalid or the run fails.
pub async fn run_bench(args: &RunArgs, file: Option<&ConfigFile>) -> AppResult<()> {
    let config = resolve_bench_config(args, file, &process_env)?;
    execute_bench(&config).await.map(|_reports| ())
}

/// Runs every configured scenario, one after another, and reports them.
///
/// The coverage metadata is resolved before any result file is opened; its
/// failure aborts the run.
///
/// # Errors
///
/// Returns an error on precondition, corpus, dispatch or report failure, and
/// after reporting when any scenario could not write its result file.
pub async fn execute_bench(config: &BenchConfig) -> AppResult<Vec<ScenarioReport>> {
    let target = &config.target;
    let client = build_client(
        target.token.as_deref(),
        config.request_timeout,
        config.connect_timeout,
        config.concurrency.get(),
    )?;

    let start_date =
        fetch_start_production_date(&client, &target.server_url, &target.coverage).await?;
    let corpus = load_corpus(&config.corpus, start_date).await?;
    info!(
        "Loaded {} requests; comparing {} scenario(s) against {}",
        corpus.len(),
        target.scenarios.len(),
        target.server_url
    );

    let dispatcher = Dispatcher::new(Arc::new(HttpTransport::new(client)), config.concurrency);
    let runner = ScenarioRunner::new(
        dispatcher,
        target.server_url.clone(),
        target.coverage.clone(),
        config.extra_args.clone(),
    );

    let mut reports = Vec::with_capacity(target.scenarios.len());
    for scenario in &target.scenarios {
        let output_path = target.scenario_path(scenario);
        let report = runner.run(scenario, &corpus, &output_path).await?;
        reports.push(report);
    }

    let series: Vec<ScenarioSeries> = reports.iter().map(ScenarioSeries::from_report).collect();
    render_report(&series, &target.report)?;
    check_output_failures(&reports)?;
    Ok(reports)
}

/// Fails when any scenario lost its result file.
///
/// # Errors
///
/// Returns [`SinkError::OutputFailures`] naming every affected scenario.
pub fn check_output_failures(reports: &[ScenarioReport]) -> AppResult<()> {
    let failed: Vec<&str> = reports
        .iter()
        .filter(|report| report.output_error.is_some())
        .map(|report| report.scenario.as_str())
        .collect();
    if failed.is_empty() {
        return Ok(());
    }
    let scenarios = failed.join(", ");
    error!("Results were not fully written for: {}", scenarios);
    Err(AppError::sink(SinkError::OutputFailures { scenarios }))
}
