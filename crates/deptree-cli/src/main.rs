//! deptree CLI
//!
//! Resolves a project's dependency tree from its `dependencies.txt`
//! manifests and writes the sub-build list for the host build system.

mod cli;
mod commands;
mod error;

use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::Result;

/// Environment variable overriding the tracing filter.
const LOG_ENV: &str = "DEPTREE_LOG";

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(cmd) => execute_command(cmd),
        None => {
            println!("{} dependency tree resolver", "deptree".green().bold());
            println!();
            println!("Run {} for available commands.", "deptree --help".cyan());
            Ok(())
        }
    }
}

/// Log to stderr so stdout stays parseable with `--json`.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("{}: tracing already initialised", "warning".yellow());
    }
    tracing::debug!("Verbose mode enabled");
}

fn execute_command(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve {
            path,
            settings,
            json,
            summary_file,
            retry_window,
        } => commands::run_resolve(
            &path,
            &settings,
            json,
            summary_file.as_deref(),
            Duration::from_secs(retry_window),
        ),
        Commands::List {
            path,
            settings,
            json,
        } => commands::run_list(&path, &settings, json),
        Commands::Config {
            path,
            settings,
            json,
        } => commands::run_config(&path, &settings, json),
    }
}
