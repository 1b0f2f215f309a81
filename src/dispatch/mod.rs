//! Bounded-concurrency executor for resolved requests.
//!
//! A feeder task spawns one tokio task per [`WorkUnit`], never more than the
//! configured concurrency at a time. Each task performs exactly one call
//! through the [`Transport`] and hands its [`RequestOutcome`] to the consumer
//! over a bounded channel. Outcomes arrive in completion order, not in index
//! order.
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::Instant;
use tracing::{debug, error};

use crate::args::PositiveUsize;
use crate::error::{AppError, AppResult, DispatchError};
use crate::http::Transport;

#[cfg(test)]
pub(crate) mod test_support;
#[cfg(test)]
mod tests;

/// Status recorded when the call never produced an HTTP response.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;
/// Elapsed time recorded for any failed request.
pub const FAILURE_ELAPSED_MS: f64 = 0.0;

/// One request with its URL resolved for a single scenario.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub index: usize,
    pub url: String,
}

impl WorkUnit {
    #[must_use]
    pub const fn new(index: usize, url: String) -> Self {
        Self { index, url }
    }
}

/// Result of executing one [`WorkUnit`].
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOutcome {
    pub index: usize,
    pub url: String,
    pub elapsed_ms: f64,
    pub status_code: u16,
    pub transport_error: bool,
}

impl RequestOutcome {
    fn measured(unit: WorkUnit, elapsed: Duration, status_code: u16) -> Self {
        Self {
            index: unit.index,
            url: unit.url,
            elapsed_ms: duration_to_ms(elapsed),
            status_code,
            transport_error: false,
        }
    }

    fn transport_failure(unit: WorkUnit) -> Self {
        Self {
            index: unit.index,
            url: unit.url,
            elapsed_ms: FAILURE_ELAPSED_MS,
            status_code: TRANSPORT_FAILURE_STATUS,
            transport_error: true,
        }
    }

    /// A request failed when the transport failed or the status is not 2xx.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        self.transport_error || is_failure_status(self.status_code)
    }
}

/// Whether a persisted status marks a failed request: no response at all,
/// or anything outside 2xx.
#[must_use]
pub const fn is_failure_status(status_code: u16) -> bool {
    status_code == TRANSPORT_FAILURE_STATUS || status_code >= 300
}

fn duration_to_ms(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1_000.0
}

/// Runs work units through a shared transport with at most `concurrency`
/// calls in flight.
#[derive(Debug)]
pub struct Dispatcher<T> {
    transport: Arc<T>,
    concurrency: PositiveUsize,
}

impl<T: Transport> Dispatcher<T> {
    #[must_use]
    pub const fn new(transport: Arc<T>, concurrency: PositiveUsize) -> Self {
        Self {
            transport,
            concurrency,
        }
    }

    #[must_use]
    pub const fn concurrency(&self) -> PositiveUsize {
        self.concurrency
    }

    /// Submits every unit and returns the stream of their outcomes.
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn dispatch(&self, units: Vec<WorkUnit>) -> Completions {
        let submitted = units.len();
        let limit = self.concurrency.get();
        let (tx, rx) = mpsc::channel(limit);
        let semaphore = Arc::new(Semaphore::new(limit));
        let feeder = tokio::spawn(feed(Arc::clone(&self.transport), semaphore, units, tx));
        debug!(
            "Dispatching {} request(s) with concurrency {}",
            submitted, limit
        );
        Completions {
            rx,
            feeder,
            submitted,
        }
    }
}

/// Outcomes of one [`Dispatcher::dispatch`] call, in completion order.
#[derive(Debug)]
pub struct Completions {
    rx: mpsc::Receiver<RequestOutcome>,
    feeder: JoinHandle<()>,
    submitted: usize,
}

impl Completions {
    /// Waits for the next finished unit. Returns `None` once every unit has
    /// reported.
    pub async fn next(&mut self) -> Option<RequestOutcome> {
        self.rx.recv().await
    }

    #[must_use]
    pub const fn submitted(&self) -> usize {
        self.submitted
    }

    /// Joins the feeder task and every unit task it spawned.
    ///
    /// Outcomes not yet received are discarded.
    ///
    /// # Errors
    ///
    /// Returns an error when the feeder task panicked or was cancelled.
    pub async fn finish(self) -> AppResult<()> {
        let Self { rx, feeder, .. } = self;
        drop(rx);
        feeder
            .await
            .map_err(|err| AppError::dispatch(DispatchError::Feeder { source: err }))
    }
}

async fn feed<T: Transport>(
    transport: Arc<T>,
    semaphore: Arc<Semaphore>,
    units: Vec<WorkUnit>,
    tx: mpsc::Sender<RequestOutcome>,
) {
    let mut tasks = JoinSet::new();
    for unit in units {
        let permit = match Arc::clone(&semaphore).acquire_owned().await {
            Ok(permit) => permit,
            Err(err) => {
                error!("Concurrency limiter closed: {}", err);
                break;
            }
        };
        let transport = Arc::clone(&transport);
        let tx = tx.clone();
        tasks.spawn(async move {
            let outcome = execute_unit(transport.as_ref(), unit).await;
            let index = outcome.index;
            if tx.send(outcome).await.is_err() {
                debug!("Outcome for request {} dropped: consumer stopped", index);
            }
            // Released once the outcome is queued; a full channel holds it.
            drop(permit);
        });
        while let Some(joined) = tasks.try_join_next() {
            log_join_failure(joined);
        }
    }
    drop(tx);
    while let Some(joined) = tasks.join_next().await {
        log_join_failure(joined);
    }
}

fn log_join_failure(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        error!("Request task failed: {}", err);
    }
}

/// Performs the single call of `unit` and times it.
///
/// Transport errors and panics inside the transport become a failure outcome
/// with status [`TRANSPORT_FAILURE_STATUS`]; nothing propagates.
pub async fn execute_unit<T: Transport>(transport: &T, unit: WorkUnit) -> RequestOutcome {
    let start = Instant::now();
    let result = AssertUnwindSafe(transport.get(&unit.url))
        .catch_unwind()
        .await;
    let elapsed = start.elapsed();
    match result {
        Ok(Ok(status)) => RequestOutcome::measured(unit, elapsed, status),
        Ok(Err(err)) => {
            debug!("Request {} to {} failed: {}", unit.index, unit.url, err);
            RequestOutcome::transport_failure(unit)
        }
        Err(_panic) => {
            error!("Request {} to {} panicked", unit.index, unit.url);
            RequestOutcome::transport_failure(unit)
        }
    }
}
