//! State management module
//!
//! Handles bookmark tracking and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state document follows the Singer layout:
//!
//! ```json
//! {
//!   "currently_syncing": "payouts",
//!   "bookmarks": {
//!     "customers": {
//!       "created_at[gt]": "2024-03-01T10:00:00.000Z",
//!       "initial_full_table_complete": true
//!     }
//!   }
//! }
//! ```
//!
//! `currently_syncing` is a crash breadcrumb naming the stream that was in
//! flight when the last snapshot was written.

mod types;

pub use types::{SyncState, INITIAL_FULL_TABLE_COMPLETE};
