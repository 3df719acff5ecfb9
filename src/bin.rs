//! CLI entry point: load configuration, build the dictionary and grid, run
//! the worker pool, report a final summary.

use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use crossgen::config::{build_grid, load_blocked_cells, Cli};
use crossgen::ipuz::FileSystemSink;
use crossgen::pool::{self, PoolConfig};
use crossgen::word_list::WordList;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "crossgen=info".into()))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(summary) => {
            tracing::info!(
                states = summary.states,
                backtracks = summary.backtracks,
                solutions = summary.solutions,
                "search finished"
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(error = %err, "fatal configuration error");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<pool::PoolSummary, crossgen::error::ConfigError> {
    let word_list = Arc::new(WordList::load(&cli.dictionary)?);

    let blocked_cells = match &cli.blocked_cells {
        Some(path) => load_blocked_cells(path)?,
        None => Vec::new(),
    };
    let grid = build_grid(&blocked_cells)?;
    let slots = Arc::new(grid.enumerate_slots());
    tracing::info!(slot_count = slots.len(), "enumerated slots");

    let sink: Arc<dyn crossgen::ipuz::SolutionSink> = Arc::new(FileSystemSink::new(&cli.output_dir)?);

    let config = PoolConfig {
        num_threads: cli.threads.unwrap_or(crossgen::DEFAULT_NUM_THREADS),
        base_seed: cli.seed,
        progress_interval: Duration::from_secs(cli.progress_interval_secs),
        solution_limit: cli.solution_limit,
    };

    Ok(pool::run(&word_list, &slots, &sink, &config))
}
