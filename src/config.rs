//! Configuration Module
//!
//! Handles loading and managing client configuration from environment variables.

use std::env;

use crate::cache::{Capacity, DEFAULT_MAXIMUM_CACHE_SIZE};

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the message service REST API
    pub base_url: String,
    /// Optional bearer token sent with every request
    pub auth_token: Option<String>,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Capacity bound of each channel's message cache
    pub maximum_cache_size: Capacity,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_BASE_URL` - Base URL of the message service (default: http://localhost:8080)
    /// - `API_AUTH_TOKEN` - Bearer token (default: unset)
    /// - `REQUEST_TIMEOUT_SECS` - Request timeout in seconds (default: 30)
    /// - `MAXIMUM_CACHE_SIZE` - Cached messages per channel; a number, or
    ///   `unbounded` to disable eviction (default: 200)
    pub fn from_env() -> Self {
        Self {
            base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            auth_token: env::var("API_AUTH_TOKEN").ok(),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            maximum_cache_size: env::var("MAXIMUM_CACHE_SIZE")
                .ok()
                .and_then(|v| parse_capacity(&v))
                .unwrap_or(Capacity::Limit(DEFAULT_MAXIMUM_CACHE_SIZE)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            auth_token: None,
            request_timeout_secs: 30,
            maximum_cache_size: Capacity::Limit(DEFAULT_MAXIMUM_CACHE_SIZE),
        }
    }
}

/// Parses a capacity value: `unbounded` or a non-negative integer.
fn parse_capacity(value: &str) -> Option<Capacity> {
    if value.eq_ignore_ascii_case("unbounded") {
        return Some(Capacity::Unbounded);
    }
    value.parse().ok().map(Capacity::Limit)
}
