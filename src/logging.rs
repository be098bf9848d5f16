//! Tracing setup.
//!
//! The TUI owns stdout, so interactive runs log to a file under the config
//! directory. `--dump` runs log to stderr. `RUST_LOG` overrides the level.

use anyhow::{anyhow, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

fn filter(debug: bool) -> EnvFilter {
    let default = if debug { "declined_payments=debug" } else { "declined_payments=info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

pub fn init_file_logging(path: &Path, debug: bool) -> Result<()> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| anyhow!(err))
}

pub fn init_stderr_logging(debug: bool) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|err| anyhow!(err))
}
