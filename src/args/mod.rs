//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod defaults;
pub(crate) mod parsers;
mod types;

#[cfg(test)]
mod tests;

pub use cli::{BenchArgs, Command, ReplotArgs, RunArgs, TargetArgs};
pub use types::{BoundingBox, InputFormat, PositiveUsize, ScenarioName};
