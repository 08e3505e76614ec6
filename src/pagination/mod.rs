//! Pagination module
//!
//! Supports: after-last-record cursors, response envelope cursors
//!
//! # Overview
//!
//! The pagination module turns a page-at-a-time `ResourceAccessor` into a
//! lazy record stream. Each strategy extracts the next page parameters from
//! a fetched page and tracks when pagination is complete.

mod stream;
mod strategies;
mod types;

pub use stream::{paginate, RecordStream};
pub use strategies::{AfterRecordPaginator, ResponseCursorPaginator, AFTER_PARAM};
pub use types::{NextPage, PaginationState, Paginator};
