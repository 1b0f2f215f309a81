//! Configuration loading and layered resolution.
//!
//! Settings are merged from built-in defaults, an optional config file, CLI
//! flags and `ROUTEBENCH_*` environment variables, in increasing precedence.
mod apply;
mod loader;
pub mod types;


pub use apply::{
    ENV_CONCURRENCY, ENV_COVERAGE, ENV_EXTRA_ARGS, ENV_OUTPUT_DIR, ENV_SERVER_URL, ENV_TOKEN,
    process_env, resolve_bench_config, resolve_target_config,
};
pub use loader::load_config;
pub use types::{BenchConfig, ConfigFile, ReportConfig, TargetConfig};

#[cfg(test)]
pub(crate) use loader::{ConfigFormat, find_default_config, load_config_file};
