//! Catalog discovery

use super::types::{Catalog, CatalogEntry, MetadataEntry};
use crate::error::Result;
use crate::schema::SchemaLoader;
use crate::streams::{StreamDefinition, STREAMS};
use crate::types::{JsonObject, JsonValue};
use tracing::debug;

/// Build the catalog of every known stream
///
/// Entries come out in registry order with selection left unset.
pub fn discover(loader: &SchemaLoader) -> Result<Catalog> {
    let streams = STREAMS
        .iter()
        .map(|def| {
            let schema = loader.load(def.id)?;
            Ok(catalog_entry(def, schema))
        })
        .collect::<Result<Vec<_>>>()?;

    debug!(streams = streams.len(), "Discovered catalog");
    Ok(Catalog::new(streams))
}

/// Catalog entry for one stream definition and its schema
pub fn catalog_entry(def: &StreamDefinition, schema: JsonValue) -> CatalogEntry {
    let metadata = standard_metadata(def, &schema);
    CatalogEntry {
        tap_stream_id: def.id.to_string(),
        stream: def.id.to_string(),
        schema,
        key_properties: def.key_properties_owned(),
        metadata,
        replication_key: def.replication_key.map(ToString::to_string),
        replication_method: def.replication_method.map(|m| m.as_str().to_string()),
        selected: None,
    }
}

/// Stream-level metadata plus one `inclusion` entry per schema property
///
/// Key properties are `automatic`, everything else `available`.
pub fn standard_metadata(def: &StreamDefinition, schema: &JsonValue) -> Vec<MetadataEntry> {
    let mut root = JsonObject::new();
    root.insert(
        "table-key-properties".to_string(),
        JsonValue::from(def.key_properties_owned()),
    );
    if let Some(method) = def.replication_method {
        root.insert(
            "forced-replication-method".to_string(),
            JsonValue::from(method.as_str()),
        );
    }
    if let Some(field) = def.bookmark_field {
        root.insert(
            "valid-replication-keys".to_string(),
            JsonValue::from(vec![field]),
        );
    }
    root.insert("inclusion".to_string(), JsonValue::from("available"));

    let mut entries = vec![MetadataEntry::root(root)];

    let properties = schema
        .get("properties")
        .and_then(JsonValue::as_object)
        .into_iter()
        .flat_map(|props| props.keys());

    for field in properties {
        let inclusion = if def.key_properties.contains(&field.as_str()) {
            "automatic"
        } else {
            "available"
        };
        let mut metadata = JsonObject::new();
        metadata.insert("inclusion".to_string(), JsonValue::from(inclusion));
        entries.push(MetadataEntry::property(field, metadata));
    }

    entries
}
