use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::time::{Duration, sleep};

use crate::error::TransportError;
use crate::http::Transport;

/// Scripted behaviour of one mocked call.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Step {
    Respond { delay_ms: u64, status: u16 },
    Refuse { delay_ms: u64 },
    Panic,
}

type Script = Box<dyn Fn(usize) -> Step + Send + Sync>;

/// Transport answering `mock://unit/{index}` URLs from a script keyed by
/// index. Tracks how many calls are in flight at once.
pub(crate) struct ScriptedTransport {
    script: Script,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new<F>(script: F) -> Self
    where
        F: Fn(usize) -> Step + Send + Sync + 'static,
    {
        Self {
            script: Box::new(script),
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub(crate) fn from_steps(steps: Vec<Step>) -> Self {
        Self::new(move |index| {
            steps
                .get(index)
                .copied()
                .unwrap_or(Step::Respond { delay_ms: 1, status: 200 })
        })
    }

    pub(crate) fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

pub(crate) fn unit_url(index: usize) -> String {
    format!("mock://unit/{}", index)
}

/// Index from an `idx=N` query parameter, else from the last path segment.
fn index_of(url: &str) -> Option<usize> {
    if let Some((_, rest)) = url.split_once("idx=") {
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        return digits.parse().ok();
    }
    url.rsplit('/').next()?.parse().ok()
}

struct InFlightGuard<'guard>(&'guard AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[expect(
    clippy::panic,
    reason = "Scripted panics exercise unit isolation in the dispatcher."
)]
#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<u16, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let step = match index_of(url) {
            Some(index) => (self.script)(index),
            None => {
                return Err(TransportError::Connection {
                    message: format!("unroutable mock url {}", url),
                });
            }
        };
        match step {
            Step::Respond { delay_ms, status } => {
                sleep(Duration::from_millis(delay_ms)).await;
                Ok(status)
            }
            Step::Refuse { delay_ms } => {
                sleep(Duration::from_millis(delay_ms)).await;
                Err(TransportError::Connection {
                    message: "connection refused".to_owned(),
                })
            }
            Step::Panic => panic!("scripted panic for {}", url),
        }
    }
}
