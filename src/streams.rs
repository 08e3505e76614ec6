//! Stream registry
//!
//! Static description of every GoCardless stream the tap knows about:
//! primary key, replication strategy, bookmark field and the parent/child
//! relationship between payouts and payout items.

use crate::types::ReplicationMethod;

/// Static definition of one stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamDefinition {
    /// Stream id, also the GoCardless list endpoint and response envelope key
    pub id: &'static str,
    /// Primary key field(s)
    pub key_properties: &'static [&'static str],
    /// Replication method (None for child streams)
    pub replication_method: Option<ReplicationMethod>,
    /// Request parameter the bookmark is sent as, e.g. `created_at[gt]`
    pub replication_key: Option<&'static str>,
    /// Record field whose maximum is tracked as the bookmark
    pub bookmark_field: Option<&'static str>,
    /// Child stream fanned out from this stream's records
    pub child_stream: Option<&'static str>,
    /// Only synced through its parent
    pub is_child: bool,
}

impl StreamDefinition {
    const fn top_level(id: &'static str) -> Self {
        Self {
            id,
            key_properties: &["id"],
            replication_method: Some(ReplicationMethod::FullTable),
            replication_key: Some("created_at[gt]"),
            bookmark_field: Some("created_at"),
            child_stream: None,
            is_child: false,
        }
    }

    const fn with_child(self, child: &'static str) -> Self {
        Self {
            child_stream: Some(child),
            ..self
        }
    }

    const fn child(id: &'static str, foreign_key: &'static [&'static str]) -> Self {
        Self {
            id,
            key_properties: foreign_key,
            replication_method: None,
            replication_key: None,
            bookmark_field: None,
            child_stream: None,
            is_child: true,
        }
    }

    /// First key property: the pagination id of a parent, or the filter
    /// field of a child
    pub fn primary_key(&self) -> &'static str {
        self.key_properties.first().copied().unwrap_or("id")
    }

    /// Key properties as owned strings
    pub fn key_properties_owned(&self) -> Vec<String> {
        self.key_properties.iter().map(ToString::to_string).collect()
    }
}

/// Every stream, in sync order
pub const STREAMS: &[StreamDefinition] = &[
    StreamDefinition::top_level("customers"),
    StreamDefinition::top_level("customer_bank_accounts"),
    StreamDefinition::top_level("events"),
    StreamDefinition::top_level("instalment_schedules"),
    StreamDefinition::top_level("mandates"),
    StreamDefinition::top_level("payments"),
    StreamDefinition::top_level("payouts").with_child("payout_items"),
    StreamDefinition::child("payout_items", &["payout"]),
    StreamDefinition::top_level("refunds"),
    StreamDefinition::top_level("subscriptions"),
    StreamDefinition::top_level("webhooks"),
];

/// Look up a stream by id
pub fn find(stream_id: &str) -> Option<&'static StreamDefinition> {
    STREAMS.iter().find(|s| s.id == stream_id)
}

/// All stream ids in registry order
pub fn stream_ids() -> impl Iterator<Item = &'static str> {
    STREAMS.iter().map(|s| s.id)
}
