// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # tap-gocardless
//!
//! A Singer tap for the GoCardless payments API.
//!
//! ## Features
//!
//! - **Eleven streams**: customers, customer bank accounts, events, instalment
//!   schedules, mandates, payments, payouts, payout items, refunds,
//!   subscriptions, webhooks
//! - **Resumable syncs**: `created_at` bookmarks, periodic STATE checkpoints
//!   and `currently_syncing` resume
//! - **Full table then incremental**: a stream's first pass reads everything,
//!   later runs only ask for records past the bookmark
//! - **Parent/child streams**: payout items are pulled per synced payout
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tap_gocardless::{catalog, client::GoCardlessClient, config::TapConfig};
//! use tap_gocardless::engine::{SyncConfig, SyncEngine};
//! use tap_gocardless::output::JsonLinesSink;
//! use tap_gocardless::schema::SchemaLoader;
//! use tap_gocardless::state::SyncState;
//!
//! #[tokio::main]
//! async fn main() -> tap_gocardless::Result<()> {
//!     let config = TapConfig::from_file("config.json")?;
//!     let mut catalog = catalog::discover(&SchemaLoader::bundled())?;
//!     catalog.select_all();
//!
//!     let client = GoCardlessClient::new(&config)?;
//!     let mut engine = SyncEngine::new(
//!         client.registry(),
//!         JsonLinesSink::new(std::io::stdout()),
//!         SyncConfig::from(&config),
//!     );
//!
//!     let mut state = SyncState::new();
//!     engine.sync(&catalog, &mut state).await
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          SyncEngine                             │
//! │  catalog + state → SCHEMA / RECORD / STATE → MessageSink        │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Streams  │  Catalog  │   Paginate    │  Client   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Registry │ Discover  │ After record  │ Accessors │ JSON lines  │
//! │ Schemas  │ Selection │ Resp. cursor  │ HTTP      │ Memory      │
//! │          │           │               │ Retry     │             │
//! │          │           │               │ Rate limit│             │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Static stream registry
pub mod streams;

/// HTTP client with retry and rate limiting
pub mod http;

/// Pagination strategies and lazy record streams
pub mod pagination;

/// Resource accessors and the GoCardless client
pub mod client;

/// Bundled JSON schemas
pub mod schema;

/// Singer catalog and discovery
pub mod catalog;

/// Bookmarks and resumability
pub mod state;

/// Singer messages and sinks
pub mod output;

/// Main sync engine
pub mod engine;

/// Tap configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
