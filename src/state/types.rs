//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs.

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Bookmark flag set once a stream has completed its first full pass
pub const INITIAL_FULL_TABLE_COMPLETE: &str = "initial_full_table_complete";

/// Complete state for the tap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncState {
    /// Stream that was in flight when the state was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_syncing: Option<String>,

    /// Per-stream bookmark values
    #[serde(default)]
    pub bookmarks: BTreeMap<String, JsonObject>,

    /// Top-level keys written by other tools, kept on round-trip
    #[serde(flatten)]
    pub extra: JsonObject,
}

impl SyncState {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Load state from a file; a missing or empty file gives empty state
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;

        if contents.trim().is_empty() {
            return Ok(Self::new());
        }

        Self::from_json(&contents)
    }

    /// Parse state from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::state(format!("Failed to parse state JSON: {e}")))
    }

    /// Serialize to a JSON value (for STATE messages)
    pub fn to_value(&self) -> Result<JsonValue> {
        serde_json::to_value(self)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Bookmarks of a stream, if any
    pub fn stream_bookmarks(&self, stream: &str) -> Option<&JsonObject> {
        self.bookmarks.get(stream)
    }

    /// Mutable bookmarks of a stream, created if needed
    pub fn stream_bookmarks_mut(&mut self, stream: &str) -> &mut JsonObject {
        self.bookmarks.entry(stream.to_string()).or_default()
    }

    /// Get one bookmark value
    pub fn get_bookmark(&self, stream: &str, key: &str) -> Option<&JsonValue> {
        self.bookmarks.get(stream)?.get(key)
    }

    /// Set one bookmark value
    pub fn write_bookmark(&mut self, stream: &str, key: &str, value: impl Into<JsonValue>) {
        self.stream_bookmarks_mut(stream)
            .insert(key.to_string(), value.into());
    }

    /// Whether the stream has completed a full pass in an earlier run
    pub fn is_initial_full_table_complete(&self, stream: &str) -> bool {
        self.get_bookmark(stream, INITIAL_FULL_TABLE_COMPLETE)
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Stream currently in flight
    pub fn currently_syncing(&self) -> Option<&str> {
        self.currently_syncing.as_deref()
    }

    /// Mark a stream as in flight
    pub fn set_currently_syncing(&mut self, stream: impl Into<String>) {
        self.currently_syncing = Some(stream.into());
    }

    /// Clear the in-flight marker
    pub fn clear_currently_syncing(&mut self) {
        self.currently_syncing = None;
    }
}
