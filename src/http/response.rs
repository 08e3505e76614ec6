//! GoCardless response conventions
//!
//! Failed requests carry a JSON error envelope:
//!
//! ```text
//! {"error": {"type": "invalid_api_usage", "code": 401, "message": "...",
//!            "request_id": "...", "documentation_url": "...", "errors": [...]}}
//! ```
//!
//! A 429 carries `RateLimit-Reset`, the HTTP date at which the per-minute
//! quota refills.

use crate::error::Error;
use chrono::{DateTime, Utc};
use reqwest::header::HeaderMap;
use serde::Deserialize;
use std::time::Duration;

/// Header holding the time the rate-limit window resets
pub const RATE_LIMIT_RESET: &str = "ratelimit-reset";

/// One rate-limit window; also the wait when a 429 names no reset time
pub const RATE_LIMIT_WINDOW: Duration = Duration::from_secs(60);

/// The `error` object of a failed response
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiError {
    /// `gocardless`, `invalid_api_usage`, `invalid_state` or `validation_failed`
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Human readable summary
    #[serde(default)]
    pub message: String,
    /// Id to quote to GoCardless support
    #[serde(default)]
    pub request_id: Option<String>,
    /// Link to the error's documentation
    #[serde(default)]
    pub documentation_url: Option<String>,
    /// Individual problems
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
}

/// One entry of `error.errors`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ApiErrorDetail {
    /// Offending request field, for validation errors
    #[serde(default)]
    pub field: Option<String>,
    /// Machine readable reason
    #[serde(default)]
    pub reason: Option<String>,
    /// Human readable message
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    error: ApiError,
}

impl ApiError {
    /// Parse an error envelope; None when the body is not one
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str::<Envelope>(body)
            .ok()
            .map(|envelope| envelope.error)
    }

    /// Top-level message followed by each detail message
    pub fn summary(&self) -> String {
        let details: Vec<String> = self
            .errors
            .iter()
            .filter_map(|detail| {
                let message = detail.message.as_deref()?;
                Some(match &detail.field {
                    Some(field) => format!("{field} {message}"),
                    None => message.to_string(),
                })
            })
            .collect();

        if details.is_empty() {
            self.message.clone()
        } else {
            format!("{} ({})", self.message, details.join("; "))
        }
    }
}

/// Error for a non-success response
///
/// GoCardless envelopes become `Error::Api`, anything else (proxies, load
/// balancers) keeps the raw body.
pub fn status_error(status: u16, body: &str) -> Error {
    match ApiError::parse(body) {
        Some(api) => Error::Api {
            status,
            error_type: api.error_type.clone(),
            message: api.summary(),
            request_id: api.request_id,
        },
        None => Error::http_status(status, body),
    }
}

/// How long to wait before retrying a 429
///
/// `RateLimit-Reset` wins over `Retry-After` (seconds). A reset already in
/// the past means no wait; the wait is capped at one window.
pub fn rate_limit_wait(headers: &HeaderMap, now: DateTime<Utc>) -> Duration {
    let reset = header_str(headers, RATE_LIMIT_RESET)
        .and_then(|value| DateTime::parse_from_rfc2822(value).ok())
        .map(|reset| {
            (reset.with_timezone(&Utc) - now)
                .to_std()
                .unwrap_or(Duration::ZERO)
        });

    let retry_after = || {
        header_str(headers, "retry-after")
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_secs)
    };

    reset
        .or_else(retry_after)
        .unwrap_or(RATE_LIMIT_WINDOW)
        .min(RATE_LIMIT_WINDOW)
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}
