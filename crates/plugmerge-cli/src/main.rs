//! plugmerge CLI
//!
//! Resolves layered plugin manifests, installs the plugins and merges them
//! into the storefront tree.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;
use tracing::Level;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::{Cli, Commands};
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    match cli.command {
        Some(cmd) => execute_command(&cli.directory, cmd),
        None => {
            println!("{} plugin resolver and merger", "plugmerge".green().bold());
            println!();
            println!("Run {} for available commands.", "plugmerge --help".cyan());
            Ok(())
        }
    }
}

/// Logs go to stderr so `status --json` output stays parseable.
fn init_tracing(verbose: bool) -> Result<()> {
    let builder = FmtSubscriber::builder().with_writer(std::io::stderr);
    let result = if verbose {
        let subscriber = builder.with_max_level(Level::DEBUG).with_target(true).finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let subscriber = builder.with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber)
    };
    result.map_err(|e| CliError::user(format!("failed to set tracing subscriber: {e}")))?;
    tracing::debug!("Verbose mode enabled");
    Ok(())
}

fn execute_command(root: &std::path::Path, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Resolve { deep, tree } => commands::run_resolve(root, deep, tree),
        Commands::Install { fail_fast } => commands::run_install(root, fail_fast),
        Commands::Merge => commands::run_merge(root),
        Commands::Sync { deep, fail_fast } => commands::run_sync(root, deep, fail_fast),
        Commands::Status { json } => commands::run_status(root, json),
        Commands::Tree => commands::run_tree(root),
    }
}
