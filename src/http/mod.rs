//! HTTP client module
//!
//! Provides the HTTP client the GoCardless accessors sit on.
//!
//! # Features
//!
//! - **Automatic Retries**: timeouts, connection failures and 5xx responses,
//!   with constant, linear or exponential backoff
//! - **Rate Limiting**: per-minute token bucket using governor, plus waiting
//!   out `RateLimit-Reset` on a 429
//! - **API Errors**: GoCardless error envelopes decoded into `Error::Api`
//! - **Authentication**: Bearer token on every request

mod client;
mod rate_limit;
mod response;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use response::{ApiError, ApiErrorDetail};

#[cfg(test)]
mod tests;
