// Inherit lint configuration from lib.rs for consistency
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::needless_pass_by_value
)]

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docmine::cli::commands::Cli;
use docmine::cli::output::{self, RunReport};
use docmine::config::Config;
use docmine::error::Result;
use docmine::tasks::{Dispatcher, TaskContext};

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}", output::format_error(&e));
            std::process::exit(1);
        }
    }
}

/// Log to stderr; stdout carries the run report.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

/// Queue the requested tasks, drain the queue and print the report.
/// Returns whether every task succeeded.
fn run(cli: Cli) -> Result<bool> {
    let mut config = Config::from_cwd()?;
    if let Some(db) = &cli.db {
        config = config.with_db_path(db.clone());
    }
    if let Some(workers) = cli.workers {
        config.settings.dispatcher.workers = workers;
    }

    let workers = config.settings.dispatcher.workers;
    let dispatcher = Dispatcher::new(workers, TaskContext::new(config));
    let report = RunReport {
        tasks: dispatcher.run(cli.tasks()),
    };
    println!("{}", output::format_json(&report));
    Ok(report.all_ok())
}
