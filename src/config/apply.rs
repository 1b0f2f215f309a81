use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::args::defaults::{
    CHART_FILE_NAME, DEFAULT_CONNECT_TIMEOUT, DEFAULT_COVERAGE, DEFAULT_OUTPUT_DIR,
    DEFAULT_REGRESSION_THRESHOLD, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SCENARIOS, DEFAULT_SERVER_URL,
};
use crate::args::parsers::parse_duration_arg;
use crate::args::{PositiveUsize, RunArgs, ScenarioName, TargetArgs};
use crate::corpus::CorpusSource;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};

use super::types::{BenchConfig, ConfigFile, ReportConfig, TargetConfig};

pub const ENV_SERVER_URL: &str = "ROUTEBENCH_SERVER_URL";
pub const ENV_COVERAGE: &str = "ROUTEBENCH_COVERAGE";
pub const ENV_TOKEN: &str = "ROUTEBENCH_TOKEN";
pub const ENV_CONCURRENCY: &str = "ROUTEBENCH_CONCURRENCY";
pub const ENV_EXTRA_ARGS: &str = "ROUTEBENCH_EXTRA_ARGS";
pub const ENV_OUTPUT_DIR: &str = "ROUTEBENCH_OUTPUT_DIR";

/// Reads a variable from the process environment, treating empty values as unset.
#[must_use]
pub fn process_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// Highest layer present wins: env, then CLI, then config file.
fn layer<T>(env: Option<T>, cli: Option<T>, file: Option<T>) -> Option<T> {
    env.or(cli).or(file)
}

/// Resolves the target settings shared by `bench` and `replot`.
///
/// # Errors
///
/// Returns an error when the server URL is invalid, the coverage is empty or
/// the scenario list is empty or contains duplicates.
pub fn resolve_target_config<E>(
    args: &TargetArgs,
    file: Option<&ConfigFile>,
    env: &E,
) -> AppResult<TargetConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let server_url = layer(
        env(ENV_SERVER_URL),
        args.server_url.clone(),
        file.and_then(|config| config.server_url.clone()),
    )
    .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
    let server_url = validate_server_url(&server_url)?;

    let coverage = layer(
        env(ENV_COVERAGE),
        args.coverage.clone(),
        file.and_then(|config| config.coverage.clone()),
    )
    .unwrap_or_else(|| DEFAULT_COVERAGE.to_owned());
    let coverage = coverage.trim().trim_matches('/').to_owned();
    if coverage.is_empty() {
        return Err(AppError::config(ConfigError::EmptyCoverage));
    }

    let token = layer(
        env(ENV_TOKEN),
        args.token.clone(),
        file.and_then(|config| config.token.clone()),
    );

    let output_dir = layer(
        env(ENV_OUTPUT_DIR),
        args.output_dir.clone(),
        file.and_then(|config| config.output_dir.clone()),
    )
    .map_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR), PathBuf::from);

    let scenarios = resolve_scenarios(args, file)?;

    let no_charts = args.no_charts || file.and_then(|config| config.no_charts).unwrap_or(false);
    let chart_path = if no_charts {
        None
    } else {
        Some(
            layer(
                None,
                args.chart_path.clone(),
                file.and_then(|config| config.chart_path.clone()),
            )
            .map_or_else(|| output_dir.join(CHART_FILE_NAME), PathBuf::from),
        )
    };
    let regression_threshold = layer(
        None,
        args.regression_threshold,
        file.and_then(|config| config.regression_threshold),
    )
    .unwrap_or(DEFAULT_REGRESSION_THRESHOLD);
    if !regression_threshold.is_finite() || regression_threshold < 0.0 {
        return Err(AppError::config(ConfigError::InvalidField {
            field: "regression_threshold",
            source: ValidationError::InvalidThreshold {
                value: regression_threshold.to_string(),
            },
        }));
    }

    Ok(TargetConfig {
        server_url,
        coverage,
        token,
        output_dir,
        scenarios,
        report: ReportConfig {
            chart_path,
            regression_threshold,
        },
    })
}

/// Resolves every setting of a `bench` run.
///
/// # Errors
///
/// Returns an error when a layer holds an invalid value or no corpus source
/// is configured.
pub fn resolve_bench_config<E>(
    args: &RunArgs,
    file: Option<&ConfigFile>,
    env: &E,
) -> AppResult<BenchConfig>
where
    E: Fn(&str) -> Option<String>,
{
    let target = resolve_target_config(&args.target, file, env)?;

    let env_concurrency = env(ENV_CONCURRENCY)
        .map(|value| {
            value
                .parse::<PositiveUsize>()
                .map_err(|err| AppError::config(ConfigError::InvalidEnv {
                    var: ENV_CONCURRENCY,
                    source: err,
                }))
        })
        .transpose()?;
    let file_concurrency = file
        .and_then(|config| config.concurrency)
        .map(|value| {
            PositiveUsize::try_from(value).map_err(|err| {
                AppError::config(ConfigError::InvalidField {
                    field: "concurrency",
                    source: err,
                })
            })
        })
        .transpose()?;
    let concurrency =
        layer(env_concurrency, args.concurrency, file_concurrency).unwrap_or(PositiveUsize::ONE);

    let extra_args = layer(
        env(ENV_EXTRA_ARGS),
        args.extra_args.clone(),
        file.and_then(|config| config.extra_args.clone()),
    )
    .unwrap_or_default();

    let request_timeout = resolve_duration(
        args.request_timeout,
        file.and_then(|config| config.timeout.as_deref()),
        "timeout",
        DEFAULT_REQUEST_TIMEOUT,
    )?;
    let connect_timeout = resolve_duration(
        args.connect_timeout,
        file.and_then(|config| config.connect_timeout.as_deref()),
        "connect_timeout",
        DEFAULT_CONNECT_TIMEOUT,
    )?;

    let corpus = resolve_corpus_source(args, file)?;

    Ok(BenchConfig {
        target,
        corpus,
        concurrency,
        extra_args,
        request_timeout,
        connect_timeout,
    })
}

fn validate_server_url(raw: &str) -> AppResult<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed).map_err(|err| {
        AppError::config(ConfigError::InvalidServerUrl {
            url: trimmed.to_owned(),
            source: err,
        })
    })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(AppError::config(ConfigError::UnsupportedScheme {
            url: trimmed.to_owned(),
        }));
    }
    Ok(trimmed.to_owned())
}

fn resolve_scenarios(args: &TargetArgs, file: Option<&ConfigFile>) -> AppResult<Vec<ScenarioName>> {
    let scenarios = if !args.scenarios.is_empty() {
        args.scenarios.clone()
    } else if let Some(from_file) = file.and_then(|config| config.scenarios.clone()) {
        from_file
    } else {
        DEFAULT_SCENARIOS
            .iter()
            .map(|name| name.parse::<ScenarioName>())
            .collect::<Result<Vec<_>, _>>()?
    };
    if scenarios.is_empty() {
        return Err(AppError::validation(ValidationError::NoScenarios));
    }
    for (position, scenario) in scenarios.iter().enumerate() {
        if scenarios
            .iter()
            .skip(position.saturating_add(1))
            .any(|other| other == scenario)
        {
            return Err(AppError::validation(ValidationError::DuplicateScenario {
                name: scenario.to_string(),
            }));
        }
    }
    Ok(scenarios)
}

fn resolve_duration(
    cli: Option<Duration>,
    file: Option<&str>,
    field: &'static str,
    default: Duration,
) -> AppResult<Duration> {
    if let Some(duration) = cli {
        return Ok(duration);
    }
    match file {
        Some(value) => parse_duration_arg(value)
            .map_err(|err| AppError::config(ConfigError::InvalidField { field, source: err })),
        None => Ok(default),
    }
}

fn resolve_corpus_source(args: &RunArgs, file: Option<&ConfigFile>) -> AppResult<CorpusSource> {
    if args.input.is_some() && args.sample_bbox.is_some() {
        return Err(AppError::validation(ValidationError::CorpusSourceConflict));
    }
    if let Some(bbox) = args.sample_bbox {
        let count = args
            .sample_count
            .ok_or_else(|| AppError::validation(ValidationError::SampleCountRequired))?;
        return Ok(CorpusSource::Sample {
            bbox,
            count,
            seed: args.sample_seed,
        });
    }
    let input = args
        .input
        .clone()
        .or_else(|| file.and_then(|config| config.input.clone()))
        .ok_or_else(|| AppError::validation(ValidationError::MissingCorpusSource))?;
    let format = if args.input.is_some() {
        args.input_format
    } else {
        file.and_then(|config| config.input_format)
            .unwrap_or(args.input_format)
    };
    Ok(CorpusSource::Csv {
        path: PathBuf::from(input),
        format,
    })
}
