mod aggregate;
mod cli;
mod metrics;
mod model;
mod orchestrator;
mod plots;
mod reader;
mod report;
mod stats;
mod text_summary;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Environment file shared with the experiment runners.
const ENV_FILE: &str = "../.env";

fn main() -> Result<()> {
    // Load before parsing so `RESULTS_VOLUME` can come from the file.
    let env_loaded = dotenvy::from_path(ENV_FILE);

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match env_loaded {
        Ok(()) => debug!("Loaded environment from {ENV_FILE}"),
        Err(e) if e.not_found() => debug!("No {ENV_FILE}, using process environment"),
        Err(e) => return Err(e).with_context(|| format!("failed to load {ENV_FILE}")),
    }

    let args = cli::Cli::parse();
    cli::run(args)
}
