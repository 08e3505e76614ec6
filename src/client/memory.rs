//! In-memory accessor
//!
//! Serves a fixed record set with the same paging rules as the GoCardless
//! list endpoints: `limit` caps the page, `after=<id>` resumes past a record,
//! `<field>[gt]=<value>` keeps records whose field is strictly greater, and
//! any other parameter filters on field equality. Used for offline runs and
//! tests of the sync engine.

use super::types::{Page, ResourceAccessor};
use crate::error::{Error, Result};
use crate::pagination::AFTER_PARAM;
use crate::types::{compare_bookmarks, scalar_to_string, QueryParams, Record};
use async_trait::async_trait;
use std::cmp::Ordering;
use std::sync::{Mutex, PoisonError};

const DEFAULT_LIMIT: usize = 50;

/// Accessor over a fixed list of records
#[derive(Debug)]
pub struct MemoryAccessor {
    stream_id: String,
    key_field: String,
    records: Vec<Record>,
    fail_on_request: Option<usize>,
    requests: Mutex<Vec<QueryParams>>,
}

impl MemoryAccessor {
    /// Create an accessor keyed on `id`
    pub fn new(stream_id: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            stream_id: stream_id.into(),
            key_field: "id".to_string(),
            records,
            fail_on_request: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Record field `after` refers to
    #[must_use]
    pub fn key_field(mut self, field: impl Into<String>) -> Self {
        self.key_field = field.into();
        self
    }

    /// Make the n-th request (0-based) fail with an HTTP 500
    #[must_use]
    pub fn fail_on_request(mut self, index: usize) -> Self {
        self.fail_on_request = Some(index);
        self
    }

    /// Parameters of every request served so far
    pub fn requests(&self) -> Vec<QueryParams> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn matches(&self, record: &Record, key: &str, expected: &str) -> bool {
        if let Some(field) = key.strip_suffix("[gt]") {
            return record
                .get(field)
                .and_then(scalar_to_string)
                .is_some_and(|value| compare_bookmarks(&value, expected) == Ordering::Greater);
        }
        record
            .get(key)
            .and_then(scalar_to_string)
            .is_some_and(|value| value == expected)
    }
}

#[async_trait]
impl ResourceAccessor for MemoryAccessor {
    fn stream_id(&self) -> &str {
        &self.stream_id
    }

    async fn list(&self, params: &QueryParams) -> Result<Page> {
        let index = {
            let mut requests = self
                .requests
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            requests.push(params.clone());
            requests.len() - 1
        };

        if self.fail_on_request == Some(index) {
            return Err(Error::http_status(500, "injected failure"));
        }

        let limit = match params.get("limit") {
            Some(limit) => limit
                .parse::<usize>()
                .map_err(|e| Error::invalid_value("limit", e.to_string()))?,
            None => DEFAULT_LIMIT,
        };

        let filtered: Vec<&Record> = self
            .records
            .iter()
            .filter(|record| {
                params
                    .iter()
                    .filter(|(key, _)| key.as_str() != "limit" && key.as_str() != AFTER_PARAM)
                    .all(|(key, value)| self.matches(record, key, value))
            })
            .collect();

        let start = match params.get(AFTER_PARAM) {
            Some(after) => filtered
                .iter()
                .position(|record| {
                    record.get(&self.key_field).and_then(scalar_to_string).as_deref()
                        == Some(after.as_str())
                })
                .map_or(filtered.len(), |pos| pos + 1),
            None => 0,
        };

        let records: Vec<Record> = filtered
            .iter()
            .skip(start)
            .take(limit)
            .map(|record| (*record).clone())
            .collect();

        let after = if start + records.len() < filtered.len() {
            records
                .last()
                .and_then(|record| record.get(&self.key_field))
                .and_then(scalar_to_string)
        } else {
            None
        };

        Ok(Page::new(records, after))
    }
}
