//! Pagination strategy implementations
//!
//! GoCardless lists are cursor paginated through an `after` parameter. The
//! cursor can come from two places: the id of the last record of a page, or
//! the `meta.cursors.after` value of the response envelope.

use super::types::{NextPage, PaginationState, Paginator};
use crate::client::Page;
use crate::error::{Error, Result};
use crate::types::{scalar_to_string, QueryParams};

/// Default cursor query parameter
pub const AFTER_PARAM: &str = "after";

// ============================================================================
// After-Record Pagination
// ============================================================================

/// Cursor taken from the key of the last record in each page
///
/// Stops on the first empty page. A non-empty page whose last record has no
/// key is an extraction error.
#[derive(Debug, Clone)]
pub struct AfterRecordPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
    /// Record field used as the cursor
    pub key_field: String,
}

impl AfterRecordPaginator {
    /// Create a new after-record paginator
    pub fn new(cursor_param: impl Into<String>, key_field: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
            key_field: key_field.into(),
        }
    }
}

impl Default for AfterRecordPaginator {
    fn default() -> Self {
        Self::new(AFTER_PARAM, "id")
    }
}

impl Paginator for AfterRecordPaginator {
    fn initial_params(&self, state: &PaginationState) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(cursor) = &state.cursor {
            params.insert(self.cursor_param.clone(), cursor.clone());
        }
        params
    }

    fn process_page(&self, page: &Page, state: &mut PaginationState) -> Result<NextPage> {
        state.add_fetched(page.records.len() as u64);

        let Some(last) = page.records.last() else {
            state.mark_done();
            return Ok(NextPage::Done);
        };

        let cursor = last
            .get(&self.key_field)
            .and_then(scalar_to_string)
            .ok_or_else(|| Error::RecordExtraction {
                path: self.key_field.clone(),
                message: format!(
                    "last record of page {} has no '{}' to continue from",
                    state.pages, self.key_field
                ),
            })?;

        state.set_cursor(cursor.clone());
        Ok(NextPage::with_param(&self.cursor_param, cursor))
    }
}

// ============================================================================
// Response Cursor Pagination
// ============================================================================

/// Cursor taken from the response envelope (`meta.cursors.after`)
///
/// Stops when the cursor is null or the page is empty.
#[derive(Debug, Clone)]
pub struct ResponseCursorPaginator {
    /// Query parameter name for cursor
    pub cursor_param: String,
}

impl ResponseCursorPaginator {
    /// Create a new response cursor paginator
    pub fn new(cursor_param: impl Into<String>) -> Self {
        Self {
            cursor_param: cursor_param.into(),
        }
    }
}

impl Default for ResponseCursorPaginator {
    fn default() -> Self {
        Self::new(AFTER_PARAM)
    }
}

impl Paginator for ResponseCursorPaginator {
    fn initial_params(&self, state: &PaginationState) -> QueryParams {
        let mut params = QueryParams::new();
        if let Some(cursor) = &state.cursor {
            params.insert(self.cursor_param.clone(), cursor.clone());
        }
        params
    }

    fn process_page(&self, page: &Page, state: &mut PaginationState) -> Result<NextPage> {
        state.add_fetched(page.records.len() as u64);

        if page.records.is_empty() {
            state.mark_done();
            return Ok(NextPage::Done);
        }

        Ok(match page.after.as_deref().filter(|c| !c.is_empty()) {
            Some(cursor) => {
                state.set_cursor(cursor.to_string());
                NextPage::with_param(&self.cursor_param, cursor)
            }
            None => {
                state.mark_done();
                NextPage::Done
            }
        })
    }
}
