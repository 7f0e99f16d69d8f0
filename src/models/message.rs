//! Message Entity Module
//!
//! Defines the cached message entity, its wire record, and identifier newtypes.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

// == Identifiers ==
/// Unique, stable identifier for a message, assigned by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for MessageId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of the channel that owns a message cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(pub String);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ChannelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ChannelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

// == Wire Record ==
/// Raw message record as returned by the remote service.
///
/// Field parsing is intentionally minimal; the record exists so that a
/// [`Message`] can be constructed or patched from a fresh response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawMessage {
    /// Unique message identifier
    pub id: MessageId,
    /// Channel the message belongs to, when the service includes it
    #[serde(default)]
    pub channel_id: Option<ChannelId>,
    /// Author username
    #[serde(default)]
    pub author: Option<String>,
    /// Message body
    #[serde(default)]
    pub content: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Last edit timestamp, if the message was edited
    #[serde(default)]
    pub edited_timestamp: Option<DateTime<Utc>>,
    /// Whether the message is pinned in its channel
    #[serde(default)]
    pub pinned: bool,
}

// == Message Entity ==
/// A cached message: immutable identity, mutable content.
///
/// Identity (`id`, `channel_id`) is fixed at construction. Content fields
/// are refreshed in place by [`Message::patch`] so that holders of a
/// [`SharedMessage`] observe overwrite-on-refetch without the cache
/// replacing the entity.
#[derive(Debug, Clone)]
pub struct Message {
    /// Unique message identifier (never changes after construction)
    id: MessageId,
    /// Owning channel (never changes after construction)
    channel_id: ChannelId,
    /// Author username
    pub author: Option<String>,
    /// Message body
    pub content: String,
    /// Creation timestamp
    pub timestamp: DateTime<Utc>,
    /// Last edit timestamp, if the message was edited
    pub edited_timestamp: Option<DateTime<Utc>>,
    /// Whether the message is pinned in its channel
    pub pinned: bool,
}

impl Message {
    // == Constructor ==
    /// Builds a message from a wire record, tagging it with its owning channel.
    ///
    /// The owning context is an explicit parameter: records from batch
    /// endpoints do not always carry a channel id of their own.
    pub fn from_raw(raw: RawMessage, channel_id: ChannelId) -> Self {
        Self {
            id: raw.id,
            channel_id,
            author: raw.author,
            content: raw.content,
            timestamp: raw.timestamp,
            edited_timestamp: raw.edited_timestamp,
            pinned: raw.pinned,
        }
    }

    // == Identity ==
    /// The message's unique identifier.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// The channel that owns this message.
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    // == Patch ==
    /// Refreshes mutable content from a fresh wire record.
    ///
    /// Identity fields are left untouched even if the record disagrees.
    pub fn patch(&mut self, raw: RawMessage) {
        self.author = raw.author;
        self.content = raw.content;
        self.timestamp = raw.timestamp;
        self.edited_timestamp = raw.edited_timestamp;
        self.pinned = raw.pinned;
    }

    // == Shared Handle ==
    /// Wraps the message in the shared handle stored by the cache.
    pub fn into_shared(self) -> SharedMessage {
        Arc::new(RwLock::new(self))
    }
}

// == Shared Handle Alias ==
/// Shared, lockable handle to a cached message.
///
/// The cache and every returned collection hold the same `Arc`, so an
/// overwrite-on-refetch is visible to all holders. Identity comparisons
/// use `Arc::ptr_eq`.
pub type SharedMessage = Arc<RwLock<Message>>;

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, content: &str) -> RawMessage {
        RawMessage {
            id: id.into(),
            channel_id: None,
            author: Some("alice".to_string()),
            content: content.to_string(),
            timestamp: Utc::now(),
            edited_timestamp: None,
            pinned: false,
        }
    }

    #[test]
    fn test_from_raw_tags_owning_channel() {
        let msg = Message::from_raw(raw("m1", "hello"), "c1".into());

        assert_eq!(msg.id(), &MessageId::from("m1"));
        assert_eq!(msg.channel_id(), &ChannelId::from("c1"));
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_patch_preserves_identity() {
        let mut msg = Message::from_raw(raw("m1", "hello"), "c1".into());

        let mut fresh = raw("m1", "edited");
        fresh.pinned = true;
        fresh.edited_timestamp = Some(Utc::now());
        msg.patch(fresh);

        assert_eq!(msg.id(), &MessageId::from("m1"));
        assert_eq!(msg.channel_id(), &ChannelId::from("c1"));
        assert_eq!(msg.content, "edited");
        assert!(msg.pinned);
        assert!(msg.edited_timestamp.is_some());
    }

    #[test]
    fn test_raw_message_deserializes_with_defaults() {
        let json = r#"{"id":"m1","timestamp":"2024-05-01T12:00:00Z"}"#;
        let raw: RawMessage = serde_json::from_str(json).unwrap();

        assert_eq!(raw.id, MessageId::from("m1"));
        assert_eq!(raw.content, "");
        assert!(raw.author.is_none());
        assert!(!raw.pinned);
    }

    #[test]
    fn test_shared_handle_identity() {
        let shared = Message::from_raw(raw("m1", "hello"), "c1".into()).into_shared();
        let other = shared.clone();

        other.write().content = "changed".to_string();

        assert!(Arc::ptr_eq(&shared, &other));
        assert_eq!(shared.read().content, "changed");
    }
}
