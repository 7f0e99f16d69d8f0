//! Data Model Module
//!
//! Defines message identity, wire records, and fetch query types.

mod message;
mod query;

// Re-export public types
pub use message::{ChannelId, Message, MessageId, RawMessage, SharedMessage};
pub use query::{FetchQuery, MessageResolvable, MessageTarget};
