//! GoCardless REST client
//!
//! Every stream maps to a list endpoint `/<stream id>` whose response is an
//! envelope keyed by the stream id:
//!
//! ```text
//! {"payments": [...], "meta": {"cursors": {"before": null, "after": "PM123"}, "limit": 50}}
//! ```

use super::types::{AccessorRegistry, Page, ResourceAccessor};
use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::http::{HttpClient, HttpClientConfig, RateLimiterConfig};
use crate::streams::STREAMS;
use crate::types::{BackoffType, JsonValue, QueryParams, Record};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Pinned API version header value
pub const API_VERSION: &str = "2015-07-06";

/// GoCardless allows 1000 requests per minute per token
pub const RATE_LIMIT_PER_MINUTE: u32 = 1000;

/// Retries for timeouts, connection failures, 5xx and 429 responses
pub const MAX_RETRIES: u32 = 5;

/// Shared connection to the GoCardless API
#[derive(Debug, Clone)]
pub struct GoCardlessClient {
    http: Arc<HttpClient>,
}

impl GoCardlessClient {
    /// Build a client from the tap config
    pub fn new(config: &TapConfig) -> Result<Self> {
        let http_config = HttpClientConfig::builder()
            .base_url(config.api_base_url())
            .header("GoCardless-Version", API_VERSION)
            .bearer_token(&config.access_token)
            .rate_limit(RateLimiterConfig::per_minute(RATE_LIMIT_PER_MINUTE))
            .max_retries(MAX_RETRIES)
            .backoff(
                BackoffType::Exponential,
                Duration::from_millis(500),
                Duration::from_secs(30),
            )
            .build();

        debug!(
            base_url = %config.api_base_url(),
            environment = %config.environment,
            "Creating GoCardless client"
        );

        Ok(Self::with_http(HttpClient::with_config(http_config)?))
    }

    /// Wrap an already configured HTTP client
    pub fn with_http(http: HttpClient) -> Self {
        Self {
            http: Arc::new(http),
        }
    }

    /// Accessor for one list endpoint
    pub fn resource(&self, stream_id: impl Into<String>) -> HttpResource {
        HttpResource {
            stream_id: stream_id.into(),
            http: Arc::clone(&self.http),
        }
    }

    /// Registry with an accessor for every known stream
    pub fn registry(&self) -> AccessorRegistry {
        STREAMS.iter().fold(AccessorRegistry::new(), |registry, def| {
            registry.with(Arc::new(self.resource(def.id)))
        })
    }
}

/// List endpoint accessor backed by the HTTP client
#[derive(Debug, Clone)]
pub struct HttpResource {
    stream_id: String,
    http: Arc<HttpClient>,
}

#[async_trait]
impl ResourceAccessor for HttpResource {
    fn stream_id(&self) -> &str {
        &self.stream_id
    }

    async fn list(&self, params: &QueryParams) -> Result<Page> {
        let path = format!("/{}", self.stream_id);
        let body: JsonValue = self.http.get_json(&path, params).await?;
        parse_page(&self.stream_id, body)
    }
}

/// Split a list response envelope into records and the next cursor
pub fn parse_page(stream_id: &str, body: JsonValue) -> Result<Page> {
    let JsonValue::Object(mut envelope) = body else {
        return Err(extraction_error(stream_id, "response is not a JSON object"));
    };

    let items = match envelope.remove(stream_id) {
        Some(JsonValue::Array(items)) => items,
        Some(_) => return Err(extraction_error(stream_id, "expected an array")),
        None => return Err(extraction_error(stream_id, "key missing from response")),
    };

    let records = items
        .into_iter()
        .map(|item| match item {
            JsonValue::Object(record) => Ok::<Record, Error>(record),
            _ => Err(extraction_error(stream_id, "list item is not an object")),
        })
        .collect::<Result<Vec<_>>>()?;

    let after = envelope
        .get("meta")
        .and_then(|meta| meta.pointer("/cursors/after"))
        .and_then(JsonValue::as_str)
        .map(ToString::to_string);

    Ok(Page::new(records, after))
}

fn extraction_error(stream_id: &str, message: &str) -> Error {
    Error::RecordExtraction {
        path: stream_id.to_string(),
        message: message.to_string(),
    }
}
