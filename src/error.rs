//! Error types for the message cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

use crate::models::{ChannelId, MessageId};

// == Fetch Error Enum ==
/// Unified error type for cache and fetch operations.
///
/// Transport failures are propagated to the caller untranslated; this
/// crate performs no retries and no partial-success aggregation. An error
/// anywhere in a batch request fails the whole call.
#[derive(Error, Debug)]
pub enum Error {
    /// Network-level failure from the HTTP client
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Remote API rejected the request (non-2xx status)
    #[error("api error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the remote service
        status: u16,
        /// Response body, as returned by the service
        message: String,
    },

    /// The requested message does not exist remotely
    #[error("message {message} not found in channel {channel}")]
    NotFound {
        /// Channel the lookup was scoped to
        channel: ChannelId,
        /// Identifier that was requested
        message: MessageId,
    },

    /// The configured base URL is not a valid URL
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

// == Result Type Alias ==
/// Convenience Result type for the message cache.
pub type Result<T> = std::result::Result<T, Error>;
