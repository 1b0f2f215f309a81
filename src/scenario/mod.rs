//! One scenario at a time: URL resolution, dispatch, aggregation and persistence.
mod runner;
mod url;


pub use runner::{FailedRequest, RunState, ScenarioReport, ScenarioRun, ScenarioRunner};
pub use url::{SCENARIO_PARAM, UrlTemplate};
