//! Common types used throughout tap-gocardless
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use crate::error::{Error, Result};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// One upstream entity: the attributes object of a list item
pub type Record = JsonObject;

/// Query parameters for a list request, ordered for stable URLs and logs
pub type QueryParams = BTreeMap<String, String>;

// ============================================================================
// Replication Method
// ============================================================================

/// How a stream is replicated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Re-extract the whole collection
    FullTable,
    /// Extract only records after the stored bookmark
    Incremental,
}

impl ReplicationMethod {
    /// Wire name as used in catalogs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FullTable => "FULL_TABLE",
            Self::Incremental => "INCREMENTAL",
        }
    }
}

impl fmt::Display for ReplicationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReplicationMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "FULL_TABLE" => Ok(Self::FullTable),
            "INCREMENTAL" => Ok(Self::Incremental),
            other => Err(Error::invalid_value(
                "replication_method",
                format!("unsupported value '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Render a scalar JSON value as a query-string / bookmark string
///
/// Strings are returned as-is, numbers and booleans in their JSON form.
/// Objects, arrays and null have no scalar form.
pub fn scalar_to_string(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Order two bookmark values
///
/// Compared chronologically when both parse as RFC 3339 timestamps (so
/// `+01:00` offsets and fractional seconds order correctly), lexically
/// otherwise.
pub fn compare_bookmarks(a: &str, b: &str) -> Ordering {
    match (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_replication_method_serde() {
        let method: ReplicationMethod = serde_json::from_str("\"INCREMENTAL\"").unwrap();
        assert_eq!(method, ReplicationMethod::Incremental);

        let json = serde_json::to_string(&ReplicationMethod::FullTable).unwrap();
        assert_eq!(json, "\"FULL_TABLE\"");
    }

    #[test]
    fn test_replication_method_from_str() {
        assert_eq!(
            "FULL_TABLE".parse::<ReplicationMethod>().unwrap(),
            ReplicationMethod::FullTable
        );
        assert_eq!(
            "INCREMENTAL".parse::<ReplicationMethod>().unwrap(),
            ReplicationMethod::Incremental
        );
        assert!("LOG_BASED".parse::<ReplicationMethod>().is_err());
        assert!("full_table".parse::<ReplicationMethod>().is_err());
    }

    #[test]
    fn test_scalar_to_string() {
        assert_eq!(scalar_to_string(&json!("abc")), Some("abc".to_string()));
        assert_eq!(scalar_to_string(&json!(42)), Some("42".to_string()));
        assert_eq!(scalar_to_string(&json!(true)), Some("true".to_string()));
        assert_eq!(scalar_to_string(&json!(null)), None);
        assert_eq!(scalar_to_string(&json!({"a": 1})), None);
    }

    #[test]
    fn test_compare_bookmarks_chronological() {
        assert_eq!(
            compare_bookmarks("2024-01-01T10:00:00+02:00", "2024-01-01T09:00:00Z"),
            Ordering::Less
        );
        assert_eq!(
            compare_bookmarks("2024-01-01T09:00:00.500Z", "2024-01-01T09:00:00Z"),
            Ordering::Greater
        );
        assert_eq!(
            compare_bookmarks("2024-01-01T09:00:00Z", "2024-01-01T11:00:00+02:00"),
            Ordering::Equal
        );
    }

    #[test]
    fn test_compare_bookmarks_lexical_fallback() {
        assert_eq!(compare_bookmarks("2024-01-01", "2023-12-31T00:00:00Z"), Ordering::Greater);
        assert_eq!(compare_bookmarks("abc", "abd"), Ordering::Less);
    }
}
