//! Fetch Query Module
//!
//! Query refinements for batch fetches and the tagged fetch/resolve inputs.

use crate::models::{MessageId, SharedMessage};

// == Fetch Query ==
/// Query refinements for a batch message fetch.
///
/// `limit`, `before`, `after`, and `around` are mutually exclusive in
/// valid usage. Exclusivity is not validated locally; the remote service
/// is the authority and rejects ambiguous combinations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchQuery {
    /// Maximum number of messages to return
    pub limit: Option<u16>,
    /// Return messages older than this id
    pub before: Option<MessageId>,
    /// Return messages newer than this id
    pub after: Option<MessageId>,
    /// Return messages surrounding this id
    pub around: Option<MessageId>,
}

impl FetchQuery {
    /// Creates an empty query (service defaults apply).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of messages to return.
    pub fn limit(mut self, limit: u16) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Restricts results to messages older than `id`.
    pub fn before(mut self, id: impl Into<MessageId>) -> Self {
        self.before = Some(id.into());
        self
    }

    /// Restricts results to messages newer than `id`.
    pub fn after(mut self, id: impl Into<MessageId>) -> Self {
        self.after = Some(id.into());
        self
    }

    /// Restricts results to messages surrounding `id`.
    pub fn around(mut self, id: impl Into<MessageId>) -> Self {
        self.around = Some(id.into());
        self
    }
}

// == Fetch Target ==
/// Tagged fetch input: a single identifier or a batch query.
#[derive(Debug, Clone)]
pub enum MessageTarget {
    /// Fetch one message by id
    Single(MessageId),
    /// Fetch a page of messages matching the query
    Batch(FetchQuery),
}

impl From<MessageId> for MessageTarget {
    fn from(id: MessageId) -> Self {
        Self::Single(id)
    }
}

impl From<&str> for MessageTarget {
    fn from(id: &str) -> Self {
        Self::Single(id.into())
    }
}

impl From<FetchQuery> for MessageTarget {
    fn from(query: FetchQuery) -> Self {
        Self::Batch(query)
    }
}

// == Resolvable Input ==
/// Heterogeneous input accepted by the resolution helpers: either an
/// already-materialized message or a raw identifier.
#[derive(Debug, Clone)]
pub enum MessageResolvable {
    /// An entity the caller already holds
    Message(SharedMessage),
    /// A raw identifier, to be looked up in the cache
    Id(MessageId),
}

impl From<SharedMessage> for MessageResolvable {
    fn from(message: SharedMessage) -> Self {
        Self::Message(message)
    }
}

impl From<MessageId> for MessageResolvable {
    fn from(id: MessageId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for MessageResolvable {
    fn from(id: &str) -> Self {
        Self::Id(id.into())
    }
}
