//! Engine types
//!
//! Configuration and statistics for the sync engine.

use crate::config::TapConfig;

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Bookmark seeded for streams that have none
    pub start_date: String,
    /// `limit` sent on incremental list requests
    pub page_size: u32,
    /// Records between STATE checkpoints (zero behaves as one)
    pub state_checkpoint_interval: u64,
}

impl SyncConfig {
    /// Create a sync config with default page size and checkpoint interval
    #[must_use]
    pub fn new(start_date: impl Into<String>) -> Self {
        Self {
            start_date: start_date.into(),
            page_size: 100,
            state_checkpoint_interval: 100,
        }
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, size: u32) -> Self {
        self.page_size = size;
        self
    }

    /// Set checkpoint interval (clamped to at least one record)
    #[must_use]
    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.state_checkpoint_interval = interval.max(1);
        self
    }
}

impl From<&TapConfig> for SyncConfig {
    fn from(config: &TapConfig) -> Self {
        Self::new(config.start_date.clone())
            .with_page_size(config.page_size)
            .with_checkpoint_interval(config.state_checkpoint_interval)
    }
}

/// Statistics from a sync operation
#[derive(Debug, Clone, Default)]
pub struct SyncStats {
    /// Records emitted for top-level streams
    pub records_synced: usize,
    /// Records emitted for child streams
    pub child_records_synced: usize,
    /// Top-level streams completed
    pub streams_synced: usize,
    /// Child streams completed
    pub child_streams_synced: usize,
    /// STATE messages written
    pub states_emitted: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Add top-level records
    pub fn add_records(&mut self, count: usize) {
        self.records_synced += count;
    }

    /// Add child records
    pub fn add_child_records(&mut self, count: usize) {
        self.child_records_synced += count;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add a child stream
    pub fn add_child_stream(&mut self) {
        self.child_streams_synced += 1;
    }

    /// Count a STATE message
    pub fn add_state(&mut self) {
        self.states_emitted += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
