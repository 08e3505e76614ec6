//! Tap configuration
//!
//! The `--config` file is a flat JSON object. `start_date` and
//! `access_token` are required; everything else has a default.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Keys that must be present (and non-empty) in every config file
pub const REQUIRED_CONFIG_KEYS: &[&str] = &["start_date", "access_token"];

/// Upper bound GoCardless accepts for the `limit` parameter
pub const MAX_PAGE_SIZE: u32 = 500;

const LIVE_BASE_URL: &str = "https://api.gocardless.com";
const SANDBOX_BASE_URL: &str = "https://api-sandbox.gocardless.com";

// ============================================================================
// Environment
// ============================================================================

/// GoCardless environment the access token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Production API
    #[default]
    Live,
    /// Sandbox API
    Sandbox,
}

impl Environment {
    /// API base URL for this environment
    pub fn base_url(&self) -> &'static str {
        match self {
            Self::Live => LIVE_BASE_URL,
            Self::Sandbox => SANDBOX_BASE_URL,
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => f.write_str("live"),
            Self::Sandbox => f.write_str("sandbox"),
        }
    }
}

// ============================================================================
// Tap Config
// ============================================================================

/// Runtime configuration loaded from `--config`
#[derive(Clone, Serialize, Deserialize)]
pub struct TapConfig {
    /// Initial bookmark for streams without one (RFC 3339 or `YYYY-MM-DD`)
    pub start_date: String,

    /// GoCardless access token
    pub access_token: String,

    /// Live or sandbox
    #[serde(default)]
    pub environment: Environment,

    /// Overrides the environment's base URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// Records requested per page
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Records between STATE checkpoints
    #[serde(default = "default_checkpoint_interval")]
    pub state_checkpoint_interval: u64,
}

fn default_page_size() -> u32 {
    100
}

fn default_checkpoint_interval() -> u64 {
    100
}

impl TapConfig {
    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse and validate a config document
    pub fn from_json(content: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(content)?;
        Self::from_value(value)
    }

    /// Validate a parsed config document
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let Some(object) = value.as_object() else {
            return Err(Error::config("config must be a JSON object"));
        };

        for key in REQUIRED_CONFIG_KEYS {
            let present = object
                .get(*key)
                .and_then(JsonValue::as_str)
                .is_some_and(|s| !s.trim().is_empty());
            if !present {
                return Err(Error::missing_field(*key));
            }
        }

        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and formats
    pub fn validate(&self) -> Result<()> {
        validate_start_date(&self.start_date)?;

        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(Error::invalid_value(
                "page_size",
                format!("must be between 1 and {MAX_PAGE_SIZE}"),
            ));
        }

        if self.state_checkpoint_interval == 0 {
            return Err(Error::invalid_value(
                "state_checkpoint_interval",
                "must be at least 1",
            ));
        }

        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)
                .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;
        }

        Ok(())
    }

    /// Base URL requests are sent to
    pub fn api_base_url(&self) -> String {
        match &self.base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => self.environment.base_url().to_string(),
        }
    }
}

impl fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TapConfig")
            .field("start_date", &self.start_date)
            .field("access_token", &"***")
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("page_size", &self.page_size)
            .field("state_checkpoint_interval", &self.state_checkpoint_interval)
            .finish()
    }
}

fn validate_start_date(value: &str) -> Result<()> {
    if DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
    {
        Ok(())
    } else {
        Err(Error::invalid_value(
            "start_date",
            format!("'{value}' is neither an RFC 3339 timestamp nor a YYYY-MM-DD date"),
        ))
    }
}
