//! Singer catalog document

use crate::error::{Error, Result};
use crate::state::SyncState;
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One `metadata` list item: a breadcrumb and the metadata at that path
///
/// The empty breadcrumb addresses the stream itself, `["properties", "<field>"]`
/// addresses a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    /// Path into the schema
    #[serde(default)]
    pub breadcrumb: Vec<String>,
    /// Metadata values
    #[serde(default)]
    pub metadata: JsonObject,
}

impl MetadataEntry {
    /// Stream-level entry
    pub fn root(metadata: JsonObject) -> Self {
        Self {
            breadcrumb: Vec::new(),
            metadata,
        }
    }

    /// Field-level entry
    pub fn property(field: &str, metadata: JsonObject) -> Self {
        Self {
            breadcrumb: vec!["properties".to_string(), field.to_string()],
            metadata,
        }
    }

    /// True for the stream-level entry
    pub fn is_root(&self) -> bool {
        self.breadcrumb.is_empty()
    }
}

/// One stream of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stream id as known to the tap
    pub tap_stream_id: String,

    /// Stream name emitted in messages
    #[serde(default)]
    pub stream: String,

    /// JSON Schema of the records
    #[serde(default)]
    pub schema: JsonValue,

    /// Primary key fields
    #[serde(default)]
    pub key_properties: Vec<String>,

    /// Breadcrumb metadata
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,

    /// Request parameter the bookmark is sent as
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,

    /// `FULL_TABLE` or `INCREMENTAL`; any other value fails at sync time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<String>,

    /// Legacy top-level selection flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl CatalogEntry {
    /// Stream name, falling back to the tap stream id
    pub fn name(&self) -> &str {
        if self.stream.is_empty() {
            &self.tap_stream_id
        } else {
            &self.stream
        }
    }

    /// Stream-level metadata, if any
    pub fn root_metadata(&self) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|entry| entry.is_root())
            .map(|entry| &entry.metadata)
    }

    /// Selected through the top-level flag or stream-level `selected` metadata
    pub fn is_selected(&self) -> bool {
        self.selected == Some(true)
            || self
                .root_metadata()
                .and_then(|m| m.get("selected"))
                .and_then(JsonValue::as_bool)
                .unwrap_or(false)
    }

    /// Mark the stream as selected
    pub fn select(&mut self) {
        self.selected = Some(true);
        match self.metadata.iter_mut().find(|entry| entry.is_root()) {
            Some(root) => {
                root.metadata
                    .insert("selected".to_string(), JsonValue::Bool(true));
            }
            None => {
                let mut metadata = JsonObject::new();
                metadata.insert("selected".to_string(), JsonValue::Bool(true));
                self.metadata.insert(0, MetadataEntry::root(metadata));
            }
        }
    }
}

/// A Singer catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    /// Entries in catalog order
    #[serde(default)]
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create a catalog from entries
    pub fn new(streams: Vec<CatalogEntry>) -> Self {
        Self { streams }
    }

    /// Load a catalog file (`--catalog` / `--properties`)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a catalog document
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::catalog(format!("invalid catalog: {e}")))
    }

    /// Pretty-printed JSON, as printed by discovery
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Entry for `tap_stream_id`
    pub fn get_stream(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams
            .iter()
            .find(|entry| entry.tap_stream_id == tap_stream_id)
    }

    /// Select every stream
    pub fn select_all(&mut self) {
        for entry in &mut self.streams {
            entry.select();
        }
    }

    /// Selected entries in catalog order, rotated so the stream named by
    /// `currently_syncing` comes first
    pub fn get_selected_streams(&self, state: &SyncState) -> Vec<&CatalogEntry> {
        let start = state
            .currently_syncing()
            .and_then(|current| {
                self.streams
                    .iter()
                    .position(|entry| entry.tap_stream_id == current)
            })
            .unwrap_or(0);

        self.streams[start..]
            .iter()
            .chain(&self.streams[..start])
            .filter(|entry| entry.is_selected())
            .collect()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// True when the catalog has no entries
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }
}
