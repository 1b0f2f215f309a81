use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use super::parsers::{
    parse_bounding_box, parse_duration_arg, parse_positive_usize, parse_scenario_name,
    parse_threshold,
};
use super::types::{BoundingBox, InputFormat, PositiveUsize, ScenarioName};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Replay a routing query corpus against backend scenarios and compare their latency."
)]
pub struct BenchArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (sets log level to debug unless overridden by ROUTEBENCH_LOG/RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Path to config file (TOML/JSON). Defaults to ./routebench.toml or ./routebench.json if present.
    #[arg(long, global = true)]
    pub config: Option<String>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the corpus against every scenario and compare them
    Bench(RunArgs),
    /// Rebuild the comparison report from existing scenario files
    Replot(ReplotArgs),
}

/// Connection and output settings shared by `bench` and `replot`.
///
/// Every value here can also come from the config file or a `ROUTEBENCH_*`
/// environment variable; the environment wins over the command line.
#[derive(Debug, Args, Clone, Default)]
pub struct TargetArgs {
    /// Base URL of the routing API (e.g. http://127.0.0.1:5000/v1)
    #[arg(long = "server-url")]
    pub server_url: Option<String>,

    /// Coverage (dataset) identifier
    #[arg(long)]
    pub coverage: Option<String>,

    /// Authorization token sent with every request
    #[arg(long)]
    pub token: Option<String>,

    /// Directory receiving one CSV file per scenario
    #[arg(long = "output-dir", short = 'o')]
    pub output_dir: Option<String>,

    /// Scenario to benchmark (repeatable; the first one is the baseline)
    #[arg(long = "scenario", short = 's', value_parser = parse_scenario_name)]
    pub scenarios: Vec<ScenarioName>,

    /// Skip chart generation
    #[arg(long = "no-charts")]
    pub no_charts: bool,

    /// Chart output path (defaults to <output-dir>/comparison.png)
    #[arg(long = "chart-path")]
    pub chart_path: Option<String>,

    /// Mean latency change (percent) beyond which a scenario is flagged
    #[arg(long = "regression-threshold", value_parser = parse_threshold)]
    pub regression_threshold: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Input corpus CSV
    #[arg(long, short = 'i')]
    pub input: Option<String>,

    /// Format of the input corpus
    #[arg(long = "input-format", value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Sample journeys inside 'min_lon,min_lat,max_lon,max_lat' instead of reading a corpus
    #[arg(long = "sample-bbox", value_parser = parse_bounding_box)]
    pub sample_bbox: Option<BoundingBox>,

    /// Number of journeys to sample
    #[arg(long = "sample-count", value_parser = parse_positive_usize)]
    pub sample_count: Option<PositiveUsize>,

    /// Seed for coordinate sampling
    #[arg(long = "sample-seed")]
    pub sample_seed: Option<u64>,

    /// Number of requests in flight at once
    #[arg(long, short = 'c', value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// Extra query string appended verbatim to every request
    #[arg(long = "extra-args", short = 'a')]
    pub extra_args: Option<String>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// Timeout for establishing a new connection (supports ms/s/m/h)
    #[arg(long = "connect-timeout", value_parser = parse_duration_arg)]
    pub connect_timeout: Option<Duration>,
}

#[derive(Debug, Args, Clone)]
pub struct ReplotArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Scenario files to compare (defaults to <output-dir>/<scenario>.csv)
    pub files: Vec<String>,
}
