//! API client module
//!
//! # Overview
//!
//! - `ResourceAccessor` - page-at-a-time access to one collection, plus a
//!   lazy `all()` traversal following the API's own cursor
//! - `AccessorRegistry` - explicit stream id → accessor lookup
//! - `GoCardlessClient` - the GoCardless implementation over `HttpClient`
//! - `MemoryAccessor` - fixed in-memory record set with the same paging rules

mod gocardless;
mod memory;
mod types;

pub use gocardless::{parse_page, GoCardlessClient, HttpResource, API_VERSION};
pub use memory::MemoryAccessor;
pub use types::{AccessorRegistry, Page, ResourceAccessor};
