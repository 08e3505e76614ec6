//! CLI arguments
//!
//! Singer taps take flags rather than subcommands: `--discover` switches to
//! discovery mode, otherwise the tap syncs.

use clap::Parser;
use std::path::PathBuf;

/// Singer tap for the GoCardless API
#[derive(Parser, Debug)]
#[command(name = "tap-gocardless")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// State file (JSON)
    #[arg(short, long)]
    pub state: Option<PathBuf>,

    /// Catalog file (JSON) selecting the streams to sync
    #[arg(long, alias = "properties")]
    pub catalog: Option<PathBuf>,

    /// Print the catalog and exit
    #[arg(short, long)]
    pub discover: bool,

    /// Read stream schemas from this directory instead of the bundled ones
    #[arg(long)]
    pub schemas_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a run does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Print the catalog
    Discover,
    /// Extract records
    Sync,
}

impl Cli {
    /// Mode selected by the flags
    pub fn mode(&self) -> Mode {
        if self.discover {
            Mode::Discover
        } else {
            Mode::Sync
        }
    }
}
