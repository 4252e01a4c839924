// SPDX-License-Identifier: GPL-3.0-or-later
// rexpad - Tracing setup

use anyhow::{anyhow, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::filter::EnvFilter;

/// `RUST_LOG` wins; otherwise `default`, or `debug` with --verbose.
fn env_filter(verbose: bool, default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { default }))
}

/// Log to a file. The TUI owns the terminal, so nothing may go to stdout/stderr.
pub fn init_file_logging(log_path: &Path, verbose: bool) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, "info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}

/// Log to stderr for the headless subcommands, keeping stdout for output.
pub fn init_stderr_logging(verbose: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose, "warn"))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("Failed to install logger: {}", e))
}
