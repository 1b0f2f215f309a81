//! Command orchestration for `bench` and `replot`.
mod bench;
mod replot;


pub use bench::{check_output_failures, execute_bench, run_bench};
pub use replot::{replot_files, run_replot};
