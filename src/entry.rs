use clap::Parser;
use tracing::error;

use crate::app::{run_bench, run_replot};
use crate::args::{BenchArgs, Command};
use crate::config::{ConfigFile, load_config};
use crate::error::AppResult;

/// Parses the command line, sets up logging and the runtime, and runs the
/// selected command.
///
/// # Errors
///
/// Returns the error of the failed command; it has already been logged.
pub fn run() -> AppResult<()> {
    let args = BenchArgs::parse();
    crate::logger::init_logging(args.verbose);

    let result = load_config(args.config.as_deref()).and_then(|file| {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;
        runtime.block_on(run_async(args.command, file.as_ref()))
    });
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

async fn run_async(command: Command, file: Option<&ConfigFile>) -> AppResult<()> {
    match command {
        Command::Bench(args) => run_bench(&args, file).await,
        Command::Replot(args) => run_replot(&args, file).await,
    }
}
