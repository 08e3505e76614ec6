//! Tests for engine module

use super::*;
use crate::catalog::{catalog_entry, Catalog};
use crate::client::{AccessorRegistry, MemoryAccessor};
use crate::output::{Message, MemorySink};
use crate::types::{JsonValue, Record};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

const START: &str = "2024-01-01T00:00:00Z";

fn record(value: JsonValue) -> Record {
    value.as_object().cloned().unwrap()
}

fn customer(id: &str, created_at: &str) -> Record {
    record(json!({"id": id, "created_at": created_at, "email": format!("{id}@example.com")}))
}

fn entry(id: &str) -> CatalogEntry {
    let mut entry = catalog_entry(
        streams::find(id).unwrap(),
        json!({"type": "object", "properties": {"id": {"type": "string"}}}),
    );
    entry.select();
    entry
}

fn catalog(ids: &[&str]) -> Catalog {
    Catalog::new(ids.iter().map(|id| entry(id)).collect())
}

fn engine(registry: AccessorRegistry, config: SyncConfig) -> SyncEngine<MemorySink> {
    SyncEngine::new(registry, MemorySink::new(), config)
}

fn ids(records: &[&Record]) -> Vec<String> {
    records
        .iter()
        .map(|r| r["id"].as_str().unwrap().to_string())
        .collect()
}

fn customers() -> Arc<MemoryAccessor> {
    Arc::new(MemoryAccessor::new(
        "customers",
        vec![
            customer("CU1", "2024-02-01T00:00:00Z"),
            customer("CU2", "2024-03-01T00:00:00Z"),
            customer("CU3", "2024-02-15T00:00:00Z"),
        ],
    ))
}

// ============================================================================
// SyncConfig / SyncStats
// ============================================================================

#[test]
fn test_sync_config_defaults() {
    let config = SyncConfig::new(START);
    assert_eq!(config.page_size, 100);
    assert_eq!(config.state_checkpoint_interval, 100);
    assert_eq!(SyncConfig::new(START).with_checkpoint_interval(0).state_checkpoint_interval, 1);
}

#[test]
fn test_sync_config_from_tap_config() {
    let tap = crate::config::TapConfig::from_value(json!({
        "start_date": "2024-05-01",
        "access_token": "t",
        "page_size": 250,
        "state_checkpoint_interval": 10
    }))
    .unwrap();
    let config = SyncConfig::from(&tap);
    assert_eq!(config.start_date, "2024-05-01");
    assert_eq!(config.page_size, 250);
    assert_eq!(config.state_checkpoint_interval, 10);
}

// ============================================================================
// Full Table
// ============================================================================

#[tokio::test]
async fn test_full_table_first_run() {
    let accessor = customers();
    let registry = AccessorRegistry::new().with(accessor.clone());
    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();

    engine.sync(&catalog(&["customers"]), &mut state).await.unwrap();

    let sink = engine.sink();
    assert_eq!(ids(&sink.records("customers")), vec!["CU1", "CU2", "CU3"]);
    assert_eq!(sink.schema_count("customers"), 1);

    // Full path reads no bookmark and sends no cursor of its own
    let requests = accessor.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].is_empty());

    assert_eq!(
        sink.last_state().unwrap(),
        &json!({
            "bookmarks": {
                "customers": {
                    "created_at[gt]": "2024-03-01T00:00:00Z",
                    "initial_full_table_complete": true
                }
            }
        })
    );
    assert!(state.currently_syncing().is_none());
    assert!(state.is_initial_full_table_complete("customers"));
    assert_eq!(engine.stats().records_synced, 3);
    assert_eq!(engine.stats().streams_synced, 1);
}

#[tokio::test]
async fn test_schema_message_shape() {
    let registry = AccessorRegistry::new().with(customers());
    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();

    engine.sync(&catalog(&["customers"]), &mut state).await.unwrap();

    match &engine.sink().messages()[0] {
        Message::Schema {
            stream,
            key_properties,
            bookmark_properties,
            schema,
        } => {
            assert_eq!(stream, "customers");
            assert_eq!(key_properties, &vec!["id".to_string()]);
            assert_eq!(bookmark_properties, &vec!["created_at".to_string()]);
            assert_eq!(schema["type"], "object");
        }
        other => panic!("expected SCHEMA first, got {other:?}"),
    }
}

// ============================================================================
// Incremental
// ============================================================================

#[tokio::test]
async fn test_second_run_is_incremental_from_bookmark() {
    let accessor = customers();
    let registry = AccessorRegistry::new().with(accessor.clone());
    let mut state = SyncState::new();

    let mut first = engine(registry.clone(), SyncConfig::new(START));
    first.sync(&catalog(&["customers"]), &mut state).await.unwrap();

    let mut second = engine(registry, SyncConfig::new(START).with_page_size(2));
    second.sync(&catalog(&["customers"]), &mut state).await.unwrap();

    // Nothing newer than CU2's created_at
    assert!(second.sink().records("customers").is_empty());

    let requests = accessor.requests();
    assert_eq!(requests.len(), 2);
    let incremental = &requests[1];
    assert_eq!(
        incremental.get("created_at[gt]"),
        Some(&"2024-03-01T00:00:00Z".to_string())
    );
    assert_eq!(incremental.get("limit"), Some(&"2".to_string()));
    assert!(!incremental.contains_key(INITIAL_FULL_TABLE_COMPLETE));

    // Working copy drops the flag, the state keeps it
    assert!(state.is_initial_full_table_complete("customers"));
}

#[tokio::test]
async fn test_incremental_cursor_follows_last_record() {
    let accessor = Arc::new(MemoryAccessor::new(
        "payments",
        (1..=5)
            .map(|i| customer(&format!("PM{i}"), &format!("2024-02-0{i}T00:00:00Z")))
            .collect(),
    ));
    let registry = AccessorRegistry::new().with(accessor.clone());
    let mut catalog = catalog(&["payments"]);
    catalog.streams[0].replication_method = Some("INCREMENTAL".to_string());

    let mut engine = engine(registry, SyncConfig::new(START).with_page_size(2));
    let mut state = SyncState::new();
    engine.sync(&catalog, &mut state).await.unwrap();

    assert_eq!(
        ids(&engine.sink().records("payments")),
        vec!["PM1", "PM2", "PM3", "PM4", "PM5"]
    );

    let afters: Vec<Option<String>> = accessor
        .requests()
        .iter()
        .map(|r| r.get("after").cloned())
        .collect();
    assert_eq!(
        afters,
        vec![
            None,
            Some("PM2".to_string()),
            Some("PM4".to_string()),
            Some("PM5".to_string()),
        ]
    );
    assert!(accessor
        .requests()
        .iter()
        .all(|r| r.get("created_at[gt]") == Some(&START.to_string())));
}

#[tokio::test]
async fn test_high_water_mark_never_decreases() {
    let accessor = Arc::new(MemoryAccessor::new(
        "events",
        vec![
            customer("EV1", "2024-02-10T00:00:00Z"),
            customer("EV2", "2024-02-01T00:00:00Z"),
            customer("EV3", "2024-02-20T00:00:00+02:00"),
            customer("EV4", "2024-02-19T23:00:00Z"),
            customer("EV5", "2023-06-01T00:00:00Z"),
        ],
    ));
    let registry = AccessorRegistry::new().with(accessor);
    let mut engine = engine(registry, SyncConfig::new(START).with_checkpoint_interval(1));
    let mut state = SyncState::new();

    engine.sync(&catalog(&["events"]), &mut state).await.unwrap();

    let marks: Vec<String> = engine
        .sink()
        .states()
        .iter()
        .map(|s| s["bookmarks"]["events"]["created_at[gt]"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(marks.len(), 6);
    for pair in marks.windows(2) {
        assert_ne!(compare_bookmarks(&pair[1], &pair[0]), Ordering::Less);
    }
    // 23:00Z on the 19th is later than 00:00+02:00 on the 20th
    assert_eq!(marks.last().unwrap(), "2024-02-19T23:00:00Z");
}

// ============================================================================
// Bookmarks and Checkpoints
// ============================================================================

#[tokio::test]
async fn test_bookmark_seeded_from_start_date() {
    let accessor = Arc::new(MemoryAccessor::new(
        "refunds",
        vec![customer("RF1", "2023-01-01T00:00:00Z")],
    ));
    let registry = AccessorRegistry::new().with(accessor);
    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();

    engine.sync(&catalog(&["refunds"]), &mut state).await.unwrap();

    // Older record does not pull the bookmark below the start date
    assert_eq!(
        state.get_bookmark("refunds", "created_at[gt]"),
        Some(&json!(START))
    );
}

#[tokio::test]
async fn test_existing_bookmark_not_reseeded() {
    let registry = AccessorRegistry::new().with(Arc::new(MemoryAccessor::new("mandates", vec![])));
    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();
    state.write_bookmark("mandates", "created_at[gt]", "2024-06-01T00:00:00Z");

    engine.sync(&catalog(&["mandates"]), &mut state).await.unwrap();

    assert_eq!(
        state.get_bookmark("mandates", "created_at[gt]"),
        Some(&json!("2024-06-01T00:00:00Z"))
    );
}

#[tokio::test]
async fn test_checkpoint_interval() {
    let accessor = Arc::new(MemoryAccessor::new(
        "subscriptions",
        (1..=5)
            .map(|i| customer(&format!("SB{i}"), "2024-02-01T00:00:00Z"))
            .collect(),
    ));
    let registry = AccessorRegistry::new().with(accessor);
    let mut engine = engine(registry, SyncConfig::new(START).with_checkpoint_interval(2));
    let mut state = SyncState::new();

    engine.sync(&catalog(&["subscriptions"]), &mut state).await.unwrap();

    let states = engine.sink().states();
    assert_eq!(states.len(), 3);
    // Checkpoints are mid-stream snapshots
    assert_eq!(states[0]["currently_syncing"], "subscriptions");
    assert!(states[2].get("currently_syncing").is_none());
    assert_eq!(engine.stats().states_emitted, 3);
}

#[tokio::test]
async fn test_failure_leaves_last_checkpoint() {
    let accessor = Arc::new(
        MemoryAccessor::new(
            "payments",
            (1..=4)
                .map(|i| customer(&format!("PM{i}"), &format!("2024-02-0{i}T00:00:00Z")))
                .collect(),
        )
        .fail_on_request(1),
    );
    let registry = AccessorRegistry::new().with(accessor);
    let mut catalog = catalog(&["payments"]);
    catalog.streams[0].replication_method = Some("INCREMENTAL".to_string());

    let mut engine = engine(
        registry,
        SyncConfig::new(START).with_page_size(2).with_checkpoint_interval(1),
    );
    let mut state = SyncState::new();

    let err = engine.sync(&catalog, &mut state).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));

    let last = engine.sink().last_state().unwrap();
    assert_eq!(last["currently_syncing"], "payments");
    assert_eq!(
        last["bookmarks"]["payments"]["created_at[gt]"],
        "2024-02-02T00:00:00Z"
    );
    assert!(last["bookmarks"]["payments"]
        .get(INITIAL_FULL_TABLE_COMPLETE)
        .is_none());
}

#[tokio::test]
async fn test_keyless_record_fails_incremental_run() {
    let mut keyless = customer("EV2", "2024-02-02T00:00:00Z");
    keyless.remove("id");
    let accessor = Arc::new(MemoryAccessor::new(
        "events",
        vec![
            customer("EV1", "2024-02-01T00:00:00Z"),
            keyless,
            customer("EV3", "2024-02-03T00:00:00Z"),
            customer("EV4", "2024-02-04T00:00:00Z"),
        ],
    ));
    let registry = AccessorRegistry::new().with(accessor.clone());
    let mut engine = engine(registry, SyncConfig::new(START).with_page_size(2));
    let mut state = SyncState::new();
    state.write_bookmark("events", "created_at[gt]", START);
    state.write_bookmark("events", INITIAL_FULL_TABLE_COMPLETE, true);

    let err = engine.sync(&catalog(&["events"]), &mut state).await.unwrap_err();

    assert!(matches!(err, Error::RecordExtraction { .. }));
    assert!(engine.sink().records("events").is_empty());
    assert_eq!(accessor.requests().len(), 1);
    assert_eq!(state.currently_syncing(), Some("events"));
}

#[tokio::test]
async fn test_zero_checkpoint_interval_checkpoints_every_record() {
    let accessor = Arc::new(MemoryAccessor::new(
        "subscriptions",
        (1..=3)
            .map(|i| customer(&format!("SB{i}"), "2024-02-01T00:00:00Z"))
            .collect(),
    ));
    let registry = AccessorRegistry::new().with(accessor);
    let config = SyncConfig {
        start_date: START.to_string(),
        page_size: 100,
        state_checkpoint_interval: 0,
    };
    let mut engine = engine(registry, config);

    engine
        .sync(&catalog(&["subscriptions"]), &mut SyncState::new())
        .await
        .unwrap();

    // One per record plus the end-of-stream snapshot
    assert_eq!(engine.sink().states().len(), 4);
}

#[tokio::test]
async fn test_catalog_replication_key_names_the_bookmark() {
    let accessor = Arc::new(MemoryAccessor::new(
        "refunds",
        vec![customer("RF1", "2024-03-01T00:00:00Z")],
    ));
    let registry = AccessorRegistry::new().with(accessor);
    let mut catalog = catalog(&["refunds"]);
    catalog.streams[0].replication_key = Some("created_at[gte]".to_string());

    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();
    engine.sync(&catalog, &mut state).await.unwrap();

    assert_eq!(
        state.get_bookmark("refunds", "created_at[gte]"),
        Some(&json!("2024-03-01T00:00:00Z"))
    );
    assert!(state.get_bookmark("refunds", "created_at[gt]").is_none());
}

#[tokio::test]
async fn test_missing_catalog_replication_key_uses_registry() {
    let registry = AccessorRegistry::new().with(customers());
    let mut catalog = catalog(&["customers"]);
    catalog.streams[0].replication_key = None;

    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();
    engine.sync(&catalog, &mut state).await.unwrap();

    assert_eq!(
        state.get_bookmark("customers", "created_at[gt]"),
        Some(&json!("2024-03-01T00:00:00Z"))
    );
}

// ============================================================================
// Replication Method
// ============================================================================

#[tokio::test]
async fn test_unsupported_replication_method() {
    let registry = AccessorRegistry::new().with(customers());
    let mut catalog = catalog(&["customers"]);
    catalog.streams[0].replication_method = Some("LOG_BASED".to_string());

    let mut engine = engine(registry, SyncConfig::new(START));
    let err = engine
        .sync(&catalog, &mut SyncState::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::UnsupportedReplicationMethod { ref stream, ref method }
            if stream == "customers" && method == "LOG_BASED"
    ));
    assert!(engine.sink().records("customers").is_empty());
}

#[tokio::test]
async fn test_completed_initial_pass_overrides_method() {
    let accessor = customers();
    let registry = AccessorRegistry::new().with(accessor.clone());
    let mut catalog = catalog(&["customers"]);
    catalog.streams[0].replication_method = Some("LOG_BASED".to_string());

    let mut state = SyncState::new();
    state.write_bookmark("customers", "created_at[gt]", "2024-02-10T00:00:00Z");
    state.write_bookmark("customers", INITIAL_FULL_TABLE_COMPLETE, true);

    let mut engine = engine(registry, SyncConfig::new(START));
    engine.sync(&catalog, &mut state).await.unwrap();

    assert_eq!(ids(&engine.sink().records("customers")), vec!["CU2", "CU3"]);
}

#[tokio::test]
async fn test_missing_method_falls_back_to_registry() {
    let registry = AccessorRegistry::new().with(customers());
    let mut catalog = catalog(&["customers"]);
    catalog.streams[0].replication_method = None;

    let mut engine = engine(registry, SyncConfig::new(START));
    engine.sync(&catalog, &mut SyncState::new()).await.unwrap();

    assert_eq!(engine.sink().records("customers").len(), 3);
}

// ============================================================================
// Parent / Child
// ============================================================================

fn payouts(ids: &[&str]) -> Arc<MemoryAccessor> {
    Arc::new(MemoryAccessor::new(
        "payouts",
        ids.iter()
            .map(|id| customer(id, "2024-02-01T00:00:00Z"))
            .collect(),
    ))
}

fn payout_items() -> Arc<MemoryAccessor> {
    Arc::new(
        MemoryAccessor::new(
            "payout_items",
            vec![
                record(json!({"payout": "A", "amount": "10"})),
                record(json!({"payout": "A", "amount": "20"})),
                record(json!({"payout": "B", "amount": "30"})),
            ],
        )
        .key_field("payout"),
    )
}

#[tokio::test]
async fn test_child_requested_once_per_distinct_parent() {
    let items = payout_items();
    let registry = AccessorRegistry::new()
        .with(payouts(&["p1", "p2", "p2", "p3"]))
        .with(items.clone());

    let mut engine = engine(registry, SyncConfig::new(START));
    engine
        .sync(&catalog(&["payouts", "payout_items"]), &mut SyncState::new())
        .await
        .unwrap();

    let parents: Vec<String> = items
        .requests()
        .iter()
        .map(|r| r["payout"].clone())
        .collect();
    assert_eq!(parents, vec!["p1", "p2", "p3"]);
}

#[tokio::test]
async fn test_payout_items_filtered_by_payout() {
    let items = payout_items();
    let registry = AccessorRegistry::new()
        .with(payouts(&["A", "B"]))
        .with(items.clone());

    let mut engine = engine(registry, SyncConfig::new(START));
    let mut state = SyncState::new();
    engine
        .sync(&catalog(&["payouts", "payout_items"]), &mut state)
        .await
        .unwrap();

    let sink = engine.sink();
    assert_eq!(sink.records("payouts").len(), 2);
    let amounts: Vec<&str> = sink
        .records("payout_items")
        .iter()
        .map(|r| r["amount"].as_str().unwrap())
        .collect();
    assert_eq!(amounts, vec!["10", "20", "30"]);
    assert_eq!(sink.schema_count("payout_items"), 1);

    // Child is synced after the parent's final STATE and keeps no bookmarks
    let messages = sink.messages();
    let last_parent_state = messages.iter().rposition(Message::is_state).unwrap();
    let first_child = messages
        .iter()
        .position(|m| m.stream() == Some("payout_items"))
        .unwrap();
    assert!(last_parent_state < first_child);
    assert!(state.stream_bookmarks("payout_items").is_none());
    assert_eq!(engine.stats().child_records_synced, 3);
}

#[tokio::test]
async fn test_unselected_child_is_skipped() {
    let items = payout_items();
    let registry = AccessorRegistry::new()
        .with(payouts(&["A"]))
        .with(items.clone());

    let mut engine = engine(registry, SyncConfig::new(START));
    engine
        .sync(&catalog(&["payouts"]), &mut SyncState::new())
        .await
        .unwrap();

    assert!(items.requests().is_empty());
    assert_eq!(engine.sink().schema_count("payout_items"), 0);
}

#[tokio::test]
async fn test_child_alone_is_not_synced() {
    let items = payout_items();
    let registry = AccessorRegistry::new().with(items.clone());

    let mut engine = engine(registry, SyncConfig::new(START));
    engine
        .sync(&catalog(&["payout_items"]), &mut SyncState::new())
        .await
        .unwrap();

    assert!(engine.sink().messages().is_empty());
    assert!(items.requests().is_empty());
}

// ============================================================================
// Ordering and Errors
// ============================================================================

#[tokio::test]
async fn test_resumes_currently_syncing_first() {
    let registry = AccessorRegistry::new()
        .with(customers())
        .with(Arc::new(MemoryAccessor::new("mandates", vec![])));

    let mut state = SyncState::new();
    state.set_currently_syncing("mandates");

    let mut engine = engine(registry, SyncConfig::new(START));
    engine
        .sync(&catalog(&["customers", "mandates"]), &mut state)
        .await
        .unwrap();

    let schema_order: Vec<&str> = engine
        .sink()
        .messages()
        .iter()
        .filter(|m| m.is_schema())
        .filter_map(Message::stream)
        .collect();
    assert_eq!(schema_order, vec!["mandates", "customers"]);
}

#[tokio::test]
async fn test_unknown_stream_fails_before_output() {
    let mut catalog = catalog(&["customers"]);
    let mut unknown = catalog.streams[0].clone();
    unknown.tap_stream_id = "invoices".to_string();
    catalog.streams.push(unknown);

    let mut engine = engine(AccessorRegistry::new().with(customers()), SyncConfig::new(START));
    let err = engine
        .sync(&catalog, &mut SyncState::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnknownStream { ref stream } if stream == "invoices"));
    assert!(engine.sink().messages().is_empty());
}

#[tokio::test]
async fn test_missing_accessor() {
    let mut engine = engine(AccessorRegistry::new(), SyncConfig::new(START));
    let err = engine
        .sync(&catalog(&["webhooks"]), &mut SyncState::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MissingAccessor { .. }));
}

#[test]
fn test_incremental_params() {
    let mut bookmarks = crate::types::JsonObject::new();
    bookmarks.insert("created_at[gt]".to_string(), json!(START));
    bookmarks.insert("nested".to_string(), json!({"a": 1}));

    let params = incremental_params(&bookmarks, 50);
    assert_eq!(params.len(), 2);
    assert_eq!(params["created_at[gt]"], START);
    assert_eq!(params["limit"], "50");
}
