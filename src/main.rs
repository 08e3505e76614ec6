//! tap-gocardless CLI
//!
//! Singer tap for the GoCardless API. Protocol messages go to stdout, logs to
//! stderr.

use clap::Parser;
use tap_gocardless::cli::{Cli, Runner};
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        tracing::error!(error = %e, "Tap failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
