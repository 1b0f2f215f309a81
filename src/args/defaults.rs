use std::time::Duration;

pub(crate) const DEFAULT_USER_AGENT: &str = concat!("routebench/", env!("CARGO_PKG_VERSION"));

pub(crate) const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000/v1";
pub(crate) const DEFAULT_COVERAGE: &str = "stif";
pub(crate) const DEFAULT_OUTPUT_DIR: &str = "results";
pub(crate) const DEFAULT_SCENARIOS: [&str; 2] = ["new_default", "experimental"];
pub(crate) const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub(crate) const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Percent change of the mean latency beyond which a verdict is not neutral.
pub(crate) const DEFAULT_REGRESSION_THRESHOLD: f64 = 5.0;
pub(crate) const CHART_FILE_NAME: &str = "comparison.png";
