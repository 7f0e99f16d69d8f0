//! Message Cache - a bounded, insertion-ordered cache of remote messages
//!
//! Provides a per-channel message cache with oldest-first eviction and
//! on-demand fetches (single id, query page, or pinned set) against a
//! remote message service.

pub mod cache;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;

pub use cache::{Capacity, MessageCache, OrderedMap, DEFAULT_MAXIMUM_CACHE_SIZE};
pub use config::Config;
pub use error::{Error, Result};
pub use fetch::{Fetched, HttpTransport, MessageCollection, MessageManager, Transport};
pub use models::{
    ChannelId, FetchQuery, Message, MessageId, MessageResolvable, MessageTarget, RawMessage,
    SharedMessage,
};
