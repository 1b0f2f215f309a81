use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(
        "Scenario '{scenario}' received {received} completions for {submitted} submitted requests."
    )]
    Incomplete {
        scenario: String,
        submitted: usize,
        received: usize,
    },
    #[error("Dispatcher task failed: {source}")]
    Feeder {
        #[source]
        source: tokio::task::JoinError,
    },
}
