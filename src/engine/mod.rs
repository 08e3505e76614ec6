//! Execution engine module
//!
//! Main sync loop and stream orchestration.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - Walks the selected streams, extracts records, keeps
//!   bookmarks and fans out to child streams
//! - `SyncConfig` - Start date, page size and checkpoint interval
//! - `SyncStats` - Counters for a finished run
//!
//! Every message, STATE included, goes through the engine's `MessageSink`.

mod extract;
mod types;

pub use extract::{full_records, incremental_params, incremental_records};
pub use types::{SyncConfig, SyncStats};

use crate::catalog::{Catalog, CatalogEntry};
use crate::client::AccessorRegistry;
use crate::error::{Error, Result};
use crate::output::MessageSink;
use crate::state::{SyncState, INITIAL_FULL_TABLE_COMPLETE};
use crate::streams::{self, StreamDefinition};
use crate::types::{compare_bookmarks, scalar_to_string, QueryParams, ReplicationMethod};
use futures::TryStreamExt;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::time::Instant;
use tracing::{debug, info};

/// Sync engine for orchestrating data extraction
pub struct SyncEngine<S: MessageSink> {
    /// Stream id → accessor
    registry: AccessorRegistry,
    /// Where messages go
    sink: S,
    /// Sync configuration
    config: SyncConfig,
    /// Statistics
    stats: SyncStats,
}

impl<S: MessageSink> SyncEngine<S> {
    /// Create a new sync engine
    pub fn new(registry: AccessorRegistry, sink: S, config: SyncConfig) -> Self {
        Self {
            registry,
            sink,
            config,
            stats: SyncStats::default(),
        }
    }

    /// Get statistics
    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    /// Get the sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Consume the engine, returning the sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Sync every selected stream of `catalog`
    ///
    /// Streams run in catalog order, starting with the one named by
    /// `currently_syncing` if a previous run was interrupted. Child streams
    /// are only reached through their parent.
    pub async fn sync(&mut self, catalog: &Catalog, state: &mut SyncState) -> Result<()> {
        let start = Instant::now();

        let selected = catalog
            .get_selected_streams(state)
            .into_iter()
            .map(|entry| {
                streams::find(&entry.tap_stream_id)
                    .map(|def| (entry, def))
                    .ok_or_else(|| Error::unknown_stream(&entry.tap_stream_id))
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            streams = selected.len(),
            resume = state.currently_syncing().unwrap_or("-"),
            "Starting sync"
        );

        for (entry, def) in selected {
            if def.is_child {
                debug!(stream = def.id, "Skipping child stream, synced with its parent");
                continue;
            }

            let parent_keys = self.sync_stream(entry, def, state).await?;

            if let Some(child) = def.child_stream {
                self.sync_child(catalog, child, &parent_keys).await?;
            }
        }

        self.stats.set_duration(start.elapsed().as_millis() as u64);

        info!(
            streams = self.stats.streams_synced,
            records = self.stats.records_synced,
            child_records = self.stats.child_records_synced,
            duration_ms = self.stats.duration_ms,
            "Sync complete"
        );

        Ok(())
    }

    /// Sync one top-level stream
    ///
    /// Returns the distinct primary keys seen when the stream has a child,
    /// an empty set otherwise.
    pub async fn sync_stream(
        &mut self,
        entry: &CatalogEntry,
        def: &StreamDefinition,
        state: &mut SyncState,
    ) -> Result<BTreeSet<String>> {
        let stream_id = def.id;
        info!(stream = stream_id, "Syncing stream");

        state.set_currently_syncing(stream_id);

        // The catalog may rename the bookmark parameter
        let replication_key = entry.replication_key.as_deref().or(def.replication_key);
        if let Some(key) = replication_key {
            if state.get_bookmark(stream_id, key).is_none() {
                debug!(
                    stream = stream_id,
                    start_date = %self.config.start_date,
                    "Seeding bookmark"
                );
                state.write_bookmark(stream_id, key, self.config.start_date.clone());
            }
        }

        let key_properties = if entry.key_properties.is_empty() {
            def.key_properties_owned()
        } else {
            entry.key_properties.clone()
        };
        let bookmark_properties: Vec<String> =
            def.bookmark_field.map(ToString::to_string).into_iter().collect();
        self.sink
            .write_schema(stream_id, &entry.schema, &key_properties, &bookmark_properties)?;

        let method = resolve_method(entry, def, state)?;
        info!(stream = stream_id, method = %method, "Extracting records");

        let accessor = self.registry.get(stream_id)?;
        let mut records = match method {
            ReplicationMethod::Incremental => {
                let mut bookmarks = state.stream_bookmarks(stream_id).cloned().unwrap_or_default();
                bookmarks.remove(INITIAL_FULL_TABLE_COMPLETE);
                incremental_records(
                    accessor.as_ref(),
                    &bookmarks,
                    self.config.page_size,
                    def.primary_key(),
                )
            }
            ReplicationMethod::FullTable => full_records(accessor.as_ref()),
        };

        let mut high_water = replication_key
            .and_then(|key| state.get_bookmark(stream_id, key))
            .and_then(scalar_to_string);
        let mut parent_keys = BTreeSet::new();
        let mut count: u64 = 0;
        let checkpoint_every = self.config.state_checkpoint_interval.max(1);

        while let Some(record) = records.try_next().await? {
            if let (Some(field), Some(key)) = (def.bookmark_field, replication_key) {
                if let Some(value) = record.get(field).and_then(scalar_to_string) {
                    let advances = high_water.as_deref().map_or(true, |current| {
                        compare_bookmarks(&value, current) == Ordering::Greater
                    });
                    if advances {
                        high_water = Some(value);
                    }
                }
                if let Some(mark) = &high_water {
                    state.write_bookmark(stream_id, key, mark.clone());
                }
            }

            if def.child_stream.is_some() {
                if let Some(parent_key) = record.get(def.primary_key()).and_then(scalar_to_string) {
                    parent_keys.insert(parent_key);
                }
            }

            self.sink.write_record(stream_id, record)?;
            self.stats.add_records(1);
            count += 1;

            if count % checkpoint_every == 0 {
                debug!(stream = stream_id, records = count, "Checkpointing state");
                self.emit_state(state)?;
            }
        }

        state.write_bookmark(stream_id, INITIAL_FULL_TABLE_COMPLETE, true);
        state.clear_currently_syncing();
        self.emit_state(state)?;
        self.stats.add_stream();

        info!(
            stream = stream_id,
            records = count,
            bookmark = high_water.as_deref().unwrap_or("-"),
            "Finished stream"
        );

        Ok(parent_keys)
    }

    /// Sync a child stream once per parent key
    ///
    /// Child streams keep no bookmarks and are always re-pulled in full.
    pub async fn sync_child(
        &mut self,
        catalog: &Catalog,
        child_id: &str,
        parent_keys: &BTreeSet<String>,
    ) -> Result<()> {
        let Some(entry) = catalog
            .get_stream(child_id)
            .filter(|entry| entry.is_selected())
        else {
            info!(stream = child_id, "Child stream not selected, skipping");
            return Ok(());
        };

        let def = streams::find(child_id).ok_or_else(|| Error::unknown_stream(child_id))?;
        let foreign_key = def.primary_key();
        let accessor = self.registry.get(child_id)?;

        info!(
            stream = child_id,
            parents = parent_keys.len(),
            "Syncing child stream"
        );

        let key_properties = if entry.key_properties.is_empty() {
            def.key_properties_owned()
        } else {
            entry.key_properties.clone()
        };
        self.sink
            .write_schema(child_id, &entry.schema, &key_properties, &[])?;

        let mut count = 0;
        for parent_key in parent_keys {
            let mut params = QueryParams::new();
            params.insert(foreign_key.to_string(), parent_key.clone());

            debug!(stream = child_id, parent = %parent_key, "Listing child records");
            let mut records = accessor.all_with(params);
            while let Some(record) = records.try_next().await? {
                self.sink.write_record(child_id, record)?;
                count += 1;
            }
        }

        self.stats.add_child_records(count);
        self.stats.add_child_stream();
        info!(stream = child_id, records = count, "Finished child stream");

        Ok(())
    }

    fn emit_state(&mut self, state: &SyncState) -> Result<()> {
        self.sink.write_state(state)?;
        self.stats.add_state();
        Ok(())
    }
}

/// Pick the extraction mode for a stream
///
/// A finished initial full-table pass switches the stream to incremental.
/// A catalog entry without a replication method falls back to the registry.
fn resolve_method(
    entry: &CatalogEntry,
    def: &StreamDefinition,
    state: &SyncState,
) -> Result<ReplicationMethod> {
    let declared = entry
        .replication_method
        .as_deref()
        .or_else(|| def.replication_method.map(|m| m.as_str()));
    let parsed = declared.and_then(|m| m.parse::<ReplicationMethod>().ok());

    if parsed == Some(ReplicationMethod::Incremental)
        || state.is_initial_full_table_complete(def.id)
    {
        return Ok(ReplicationMethod::Incremental);
    }

    match parsed {
        Some(ReplicationMethod::FullTable) => Ok(ReplicationMethod::FullTable),
        _ => Err(Error::UnsupportedReplicationMethod {
            stream: def.id.to_string(),
            method: declared.unwrap_or("none").to_string(),
        }),
    }
}

#[cfg(test)]
mod tests;
