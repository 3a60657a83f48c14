//! Backend API endpoint configuration

use serde::{Deserialize, Serialize};

/// Configuration for the backend verification API client
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the verification API
    pub base_url: String,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum retry attempts for transport failures on idempotent requests
    #[serde(default = "default_max_retries")]
    pub max_transport_retries: u32,

    /// Delay between transport retries in milliseconds
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://api.numrelay.io/v1"),
            request_timeout_secs: 30,
            max_transport_retries: default_max_retries(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl ApiConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let base_url = std::env::var("NUMRELAY_API_BASE_URL")
            .unwrap_or(defaults.base_url);
        let request_timeout_secs = std::env::var("NUMRELAY_API_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.request_timeout_secs);
        let max_transport_retries = std::env::var("NUMRELAY_API_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.max_transport_retries);
        let retry_delay_ms = std::env::var("NUMRELAY_API_RETRY_DELAY_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.retry_delay_ms);

        Self {
            base_url,
            request_timeout_secs,
            max_transport_retries,
            retry_delay_ms,
        }
    }

    /// Create a new configuration with the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_delay_ms() -> u64 {
    500
}
