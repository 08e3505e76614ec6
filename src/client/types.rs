//! Accessor abstractions shared by the sync engine and the API client

use crate::error::{Error, Result};
use crate::pagination::{paginate, RecordStream, ResponseCursorPaginator};
use crate::types::{QueryParams, Record};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;

/// One page of a list response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Records in delivery order
    pub records: Vec<Record>,
    /// Cursor reported by the API for the next page, if any
    pub after: Option<String>,
}

impl Page {
    /// Create a page
    pub fn new(records: Vec<Record>, after: Option<String>) -> Self {
        Self { records, after }
    }

    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the page carries no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read access to one upstream collection
#[async_trait]
pub trait ResourceAccessor: Send + Sync {
    /// Stream id this accessor serves
    fn stream_id(&self) -> &str;

    /// Fetch one page with the given query parameters
    async fn list(&self, params: &QueryParams) -> Result<Page>;

    /// Every record of the collection, following the response cursor
    fn all(&self) -> RecordStream<'_> {
        self.all_with(QueryParams::new())
    }

    /// Every record matching `params`, following the response cursor
    fn all_with(&self, params: QueryParams) -> RecordStream<'_> {
        paginate(self, params, ResponseCursorPaginator::default())
    }
}

/// Explicit stream id → accessor lookup
#[derive(Clone, Default)]
pub struct AccessorRegistry {
    accessors: BTreeMap<String, Arc<dyn ResourceAccessor>>,
}

impl AccessorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accessor under its stream id, replacing any previous one
    pub fn register(&mut self, accessor: Arc<dyn ResourceAccessor>) {
        self.accessors
            .insert(accessor.stream_id().to_string(), accessor);
    }

    /// Builder-style `register`
    #[must_use]
    pub fn with(mut self, accessor: Arc<dyn ResourceAccessor>) -> Self {
        self.register(accessor);
        self
    }

    /// Accessor for `stream_id`
    pub fn get(&self, stream_id: &str) -> Result<Arc<dyn ResourceAccessor>> {
        self.accessors
            .get(stream_id)
            .cloned()
            .ok_or_else(|| Error::MissingAccessor {
                stream: stream_id.to_string(),
            })
    }

    /// Whether an accessor is registered for `stream_id`
    pub fn contains(&self, stream_id: &str) -> bool {
        self.accessors.contains_key(stream_id)
    }

    /// Registered stream ids, sorted
    pub fn stream_ids(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }

    /// Number of registered accessors
    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    /// True when nothing is registered
    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

impl std::fmt::Debug for AccessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessorRegistry")
            .field("streams", &self.accessors.keys().collect::<Vec<_>>())
            .finish()
    }
}
