use std::path::{Path, PathBuf};

use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::url::UrlTemplate;
use crate::args::ScenarioName;
use crate::corpus::RequestCorpus;
use crate::dispatch::{Dispatcher, FAILURE_ELAPSED_MS, RequestOutcome, WorkUnit};
use crate::error::{AppError, AppResult, DispatchError, SinkError};
use crate::http::Transport;
use crate::sinks::ResultSink;
use crate::store::OrderedResultStore;

const PROGRESS_STEPS: usize = 10;

/// Lifecycle of one scenario run. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RunState {
    /// Sink opened, nothing received yet.
    Created,
    Running,
    /// Every submitted request has reported.
    Drained,
    /// Sink released.
    Closed,
}

/// A request recorded with the sentinel latency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedRequest {
    pub index: usize,
    pub url: String,
    pub status_code: u16,
    pub transport_error: bool,
}

/// Everything a finished scenario hands to the comparison report.
#[derive(Debug)]
pub struct ScenarioReport {
    pub scenario: ScenarioName,
    /// Elapsed milliseconds in ascending request index; failures are zero.
    pub series: Vec<f64>,
    pub failures: Vec<FailedRequest>,
    pub output_path: PathBuf,
    /// Set when the result file could not be fully written.
    pub output_error: Option<SinkError>,
}

impl ScenarioReport {
    #[must_use]
    pub fn successes(&self) -> usize {
        self.series.len().saturating_sub(self.failures.len())
    }
}

/// Aggregation and persistence state of one scenario.
#[derive(Debug)]
pub struct ScenarioRun {
    scenario: ScenarioName,
    state: RunState,
    submitted: usize,
    received: usize,
    progress_step: usize,
    store: OrderedResultStore,
    sink: Option<ResultSink>,
    output_path: PathBuf,
    output_error: Option<SinkError>,
    failures: Vec<FailedRequest>,
}

impl ScenarioRun {
    /// Opens the result file and prepares to receive `submitted` outcomes.
    ///
    /// A file that cannot be opened is logged and recorded; the run still
    /// aggregates in memory.
    pub async fn open(scenario: ScenarioName, submitted: usize, output_path: &Path) -> Self {
        let (sink, output_error) = match ResultSink::open(output_path).await {
            Ok(sink) => (Some(sink), None),
            Err(err) => {
                error!("Scenario {}: {}", scenario, err);
                (None, Some(err))
            }
        };
        let state = if submitted == 0 {
            RunState::Drained
        } else {
            RunState::Created
        };
        Self {
            scenario,
            state,
            submitted,
            received: 0,
            progress_step: submitted.checked_div(PROGRESS_STEPS).unwrap_or(0).max(1),
            store: OrderedResultStore::new(),
            sink,
            output_path: output_path.to_path_buf(),
            output_error,
            failures: Vec::new(),
        }
    }

    #[must_use]
    pub const fn state(&self) -> RunState {
        self.state
    }

    #[must_use]
    pub const fn received(&self) -> usize {
        self.received
    }

    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Records one outcome in the store and the result file.
    ///
    /// Returns `false` when the outcome was ignored because the run has
    /// already drained.
    pub async fn record(&mut self, outcome: RequestOutcome) -> bool {
        match self.state {
            RunState::Drained | RunState::Closed => {
                warn!(
                    "Scenario {}: ignoring outcome for request {} received after drain",
                    self.scenario, outcome.index
                );
                return false;
            }
            RunState::Created => self.state = RunState::Running,
            RunState::Running => {}
        }

        let elapsed_ms = if outcome.is_failure() {
            warn!(
                "Scenario {}: request {} failed with status {}: {}",
                self.scenario, outcome.index, outcome.status_code, outcome.url
            );
            self.failures.push(FailedRequest {
                index: outcome.index,
                url: outcome.url.clone(),
                status_code: outcome.status_code,
                transport_error: outcome.transport_error,
            });
            FAILURE_ELAPSED_MS
        } else {
            outcome.elapsed_ms
        };
        if self.store.insert(outcome.index, elapsed_ms).is_some() {
            warn!(
                "Scenario {}: request {} reported twice, keeping the last outcome",
                self.scenario, outcome.index
            );
        }

        let persisted = RequestOutcome {
            elapsed_ms,
            ..outcome
        };
        if let Some(sink) = self.sink.as_mut()
            && let Err(err) = sink.append(&persisted).await
        {
            error!("Scenario {}: {}", self.scenario, err);
            self.output_error = Some(err);
            self.sink = None;
        }

        self.received = self.received.saturating_add(1);
        self.log_progress();
        if self.received >= self.submitted {
            self.state = RunState::Drained;
        }
        true
    }

    fn log_progress(&self) {
        let at_step = self.received.checked_rem(self.progress_step) == Some(0);
        if at_step || self.received == self.submitted {
            let percent = self
                .received
                .saturating_mul(100)
                .checked_div(self.submitted)
                .unwrap_or(100);
            info!(
                "Scenario {}: {}/{} requests ({}%)",
                self.scenario, self.received, self.submitted, percent
            );
        }
    }

    /// Releases the result file and produces the report.
    ///
    /// A drained run rewrites its file in index order; any other run leaves
    /// the file as written.
    pub async fn close(mut self) -> ScenarioReport {
        if let Some(sink) = self.sink.take() {
            debug!("Scenario {}: {} rows written", self.scenario, sink.rows());
            let closed = if self.state == RunState::Drained {
                sink.finalize().await
            } else {
                sink.close().await
            };
            if let Err(err) = closed {
                error!("Scenario {}: {}", self.scenario, err);
                self.output_error = Some(err);
            }
        }
        self.state = RunState::Closed;
        ScenarioReport {
            scenario: self.scenario,
            series: self.store.into_series(),
            failures: self.failures,
            output_path: self.output_path,
            output_error: self.output_error,
        }
    }
}

/// Replays a corpus against one scenario at a time.
#[derive(Debug)]
pub struct ScenarioRunner<T> {
    dispatcher: Dispatcher<T>,
    server_url: String,
    coverage: String,
    extra_args: String,
}

impl<T: Transport> ScenarioRunner<T> {
    #[must_use]
    pub const fn new(
        dispatcher: Dispatcher<T>,
        server_url: String,
        coverage: String,
        extra_args: String,
    ) -> Self {
        Self {
            dispatcher,
            server_url,
            coverage,
            extra_args,
        }
    }

    /// Template resolving corpus requests for `scenario`.
    #[must_use]
    pub fn template(&self, scenario: &ScenarioName) -> UrlTemplate {
        UrlTemplate::new(&self.server_url, &self.coverage, scenario, &self.extra_args)
    }

    /// Runs every request of `corpus` against `scenario`, writing outcomes to
    /// `output_path` as they complete.
    ///
    /// # Errors
    ///
    /// Returns an error when the dispatcher delivered fewer outcomes than
    /// requests submitted, or its feeder task failed. Request failures and
    /// output failures are recorded in the report instead.
    pub async fn run(
        &self,
        scenario: &ScenarioName,
        corpus: &RequestCorpus,
        output_path: &Path,
    ) -> AppResult<ScenarioReport> {
        let template = self.template(scenario);
        let units: Vec<WorkUnit> = corpus
            .iter()
            .map(|request| WorkUnit::new(request.index(), template.resolve(request)))
            .collect();

        let mut run = ScenarioRun::open(scenario.clone(), units.len(), output_path).await;
        info!(
            "Scenario {}: dispatching {} requests with concurrency {}",
            scenario,
            units.len(),
            self.dispatcher.concurrency().get()
        );
        let started = Instant::now();

        let mut completions = self.dispatcher.dispatch(units);
        while let Some(outcome) = completions.next().await {
            run.record(outcome).await;
        }
        let submitted = completions.submitted();
        completions.finish().await?;

        if run.state() != RunState::Drained {
            let received = run.received();
            let report = run.close().await;
            error!(
                "Scenario {}: completion stream ended after {} of {} requests; partial results in {}",
                scenario,
                received,
                submitted,
                report.output_path.display()
            );
            return Err(AppError::dispatch(DispatchError::Incomplete {
                scenario: scenario.to_string(),
                submitted,
                received,
            }));
        }

        let report = run.close().await;
        info!(
            "Scenario {}: finished in {:.2}s ({} failed)",
            scenario,
            started.elapsed().as_secs_f64(),
            report.failures.len()
        );
        Ok(report)
    }
}
