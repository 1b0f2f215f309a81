use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error(
        "Invalid scenario name '{value}'. Use a non-empty name without whitespace or path separators."
    )]
    InvalidScenarioName { value: String },
    #[error("Invalid bounding box '{value}'. Expected 'min_lon,min_lat,max_lon,max_lat'.")]
    InvalidBoundingBoxFormat { value: String },
    #[error("Invalid bounding box coordinate '{value}': {source}")]
    InvalidBoundingBoxNumber {
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error("Bounding box '{value}' is empty or inverted.")]
    BoundingBoxInverted { value: String },
    #[error("Missing corpus: set --input or --sample-bbox with --sample-count.")]
    MissingCorpusSource,
    #[error("Cannot combine --input with --sample-bbox.")]
    CorpusSourceConflict,
    #[error("--sample-bbox requires --sample-count.")]
    SampleCountRequired,
    #[error("At least one scenario is required.")]
    NoScenarios,
    #[error("Scenario '{name}' is listed more than once.")]
    DuplicateScenario { name: String },
    #[error("Regression threshold must be a non-negative percentage, got '{value}'.")]
    InvalidThreshold { value: String },
}
