use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::args::{InputFormat, PositiveUsize, ScenarioName};
use crate::corpus::CorpusSource;

/// Values accepted from `routebench.toml` / `routebench.json`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub server_url: Option<String>,
    pub coverage: Option<String>,
    pub token: Option<String>,
    pub concurrency: Option<usize>,
    pub extra_args: Option<String>,
    pub output_dir: Option<String>,
    pub scenarios: Option<Vec<ScenarioName>>,
    pub input: Option<String>,
    pub input_format: Option<InputFormat>,
    pub timeout: Option<String>,
    pub connect_timeout: Option<String>,
    pub no_charts: Option<bool>,
    pub chart_path: Option<String>,
    pub regression_threshold: Option<f64>,
}

/// Where the API lives, which scenarios to compare and where results go.
#[derive(Debug, Clone)]
pub struct TargetConfig {
    /// Base URL without a trailing slash.
    pub server_url: String,
    pub coverage: String,
    pub token: Option<String>,
    pub output_dir: PathBuf,
    pub scenarios: Vec<ScenarioName>,
    pub report: ReportConfig,
}

impl TargetConfig {
    /// Output file of one scenario run.
    #[must_use]
    pub fn scenario_path(&self, scenario: &ScenarioName) -> PathBuf {
        self.output_dir.join(format!("{}.csv", scenario))
    }
}

#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// `None` disables chart rendering.
    pub chart_path: Option<PathBuf>,
    pub regression_threshold: f64,
}

/// Fully resolved settings of one `bench` invocation.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub target: TargetConfig,
    pub corpus: CorpusSource,
    pub concurrency: PositiveUsize,
    pub extra_args: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
}
