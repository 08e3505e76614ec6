//! CLI module
//!
//! Command-line interface for running the tap.
//!
//! # Modes
//!
//! - `--discover` - Print the catalog of every stream
//! - default - Sync the streams selected in `--catalog` (all streams when no
//!   catalog is given), resuming from `--state`

mod commands;
mod runner;

pub use commands::{Cli, Mode};
pub use runner::Runner;
