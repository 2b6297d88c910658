mod cli;
mod cmd;
mod compose;
mod config;
mod deploy;
mod error;
mod git;
mod nginx;
mod os;
mod output;
mod probe;
mod ssh;

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::filter::{filter_fn, LevelFilter, Targets};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_path = match init_logging(&cli) {
        Ok(path) => path,
        Err(e) => {
            output::error(&format!("{:#}", e));
            return ExitCode::FAILURE;
        }
    };

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::error(&format!("{:#}", e));
            output::info(&format!("Full log: {}", log_path.display()));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let project_root = std::env::current_dir()?;
    cli::deploy::run(cli, project_root).await
}

/// Console: stderr, level from `-v` or `RUST_LOG`. File: everything this
/// crate emits, including the user-facing messages.
fn init_logging(cli: &Cli) -> Result<PathBuf> {
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    std::fs::create_dir_all(&cli.log_dir)
        .with_context(|| format!("Failed to create log directory: {}", cli.log_dir.display()))?;
    let path = cli::deploy::log_path(&cli.log_dir);
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file: {}", path.display()))?;

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .without_time()
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_filter(filter_fn(|meta| meta.target() != output::CONSOLE_TARGET));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(
            Targets::new()
                .with_target(env!("CARGO_CRATE_NAME"), LevelFilter::DEBUG)
                .with_default(LevelFilter::WARN),
        );

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();

    Ok(path)
}
