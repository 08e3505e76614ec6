//! Schema loader implementation

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bundled schema documents, keyed by stream id
const BUNDLED: &[(&str, &str)] = &[
    ("customers", include_str!("../../schemas/customers.json")),
    (
        "customer_bank_accounts",
        include_str!("../../schemas/customer_bank_accounts.json"),
    ),
    ("events", include_str!("../../schemas/events.json")),
    (
        "instalment_schedules",
        include_str!("../../schemas/instalment_schedules.json"),
    ),
    ("mandates", include_str!("../../schemas/mandates.json")),
    ("payments", include_str!("../../schemas/payments.json")),
    ("payouts", include_str!("../../schemas/payouts.json")),
    ("payout_items", include_str!("../../schemas/payout_items.json")),
    ("refunds", include_str!("../../schemas/refunds.json")),
    ("subscriptions", include_str!("../../schemas/subscriptions.json")),
    ("webhooks", include_str!("../../schemas/webhooks.json")),
];

/// Where schema documents are read from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSource {
    /// Documents compiled into the binary
    #[default]
    Bundled,
    /// `<dir>/<stream>.json` files
    Directory(PathBuf),
}

/// Loads the static schema document of each stream
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    source: SchemaSource,
}

impl SchemaLoader {
    /// Loader over the bundled documents
    pub fn bundled() -> Self {
        Self {
            source: SchemaSource::Bundled,
        }
    }

    /// Loader reading `<dir>/<stream>.json`
    pub fn from_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            source: SchemaSource::Directory(dir.as_ref().to_path_buf()),
        }
    }

    /// Get the configured source
    pub fn source(&self) -> &SchemaSource {
        &self.source
    }

    /// Load the schema of one stream
    pub fn load(&self, stream_id: &str) -> Result<JsonValue> {
        let raw = match &self.source {
            SchemaSource::Bundled => BUNDLED
                .iter()
                .find(|(id, _)| *id == stream_id)
                .map(|(_, doc)| (*doc).to_string())
                .ok_or_else(|| Error::schema(stream_id, "no bundled schema"))?,
            SchemaSource::Directory(dir) => {
                let path = dir.join(format!("{stream_id}.json"));
                if !path.exists() {
                    return Err(Error::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                debug!(stream = stream_id, path = %path.display(), "Reading schema");
                std::fs::read_to_string(&path)?
            }
        };

        let schema: JsonValue = serde_json::from_str(&raw)
            .map_err(|e| Error::schema(stream_id, format!("invalid JSON: {e}")))?;

        if !schema.is_object() {
            return Err(Error::schema(stream_id, "schema must be a JSON object"));
        }

        Ok(schema)
    }
}
