//! Message Manager Module
//!
//! Per-channel fetch orchestration: single-id and batch reads against the
//! transport, merged into the bounded cache, plus the synchronous
//! resolution helpers.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::cache::{Capacity, MessageCache, OrderedMap};
use crate::error::Result;
use crate::fetch::Transport;
use crate::models::{
    ChannelId, FetchQuery, Message, MessageId, MessageResolvable, MessageTarget, RawMessage,
    SharedMessage,
};

// == Result Collection ==
/// Ordered collection of fetched messages, keyed by id.
///
/// Iteration order is the order the service returned the records.
pub type MessageCollection = OrderedMap<MessageId, SharedMessage>;

// == Fetch Outcome ==
/// Outcome of [`MessageManager::fetch`], mirroring the tagged input.
#[derive(Debug)]
pub enum Fetched {
    /// Result of a single-id fetch
    Single(SharedMessage),
    /// Result of a batch fetch
    Batch(MessageCollection),
}

// == Message Manager ==
/// Manages the message cache of one channel and the fetches that fill it.
///
/// The cache lock is never held across an await: a fetch suspends on the
/// transport first and merges afterwards, so concurrent fetches for the
/// same id both complete and the last writer wins on overwrite.
pub struct MessageManager<T: Transport> {
    /// Owning channel; every cached message is tagged with it
    channel_id: ChannelId,
    /// Remote read collaborator
    transport: Arc<T>,
    /// Canonical store for this channel's messages
    cache: RwLock<MessageCache>,
}

impl<T: Transport> MessageManager<T> {
    // == Constructor ==
    /// Creates a manager for `channel_id` with the given capacity policy.
    pub fn new(channel_id: ChannelId, transport: Arc<T>, capacity: Capacity) -> Self {
        Self {
            channel_id,
            transport,
            cache: RwLock::new(MessageCache::new(capacity)),
        }
    }

    // == Fetch ==
    /// Fetches one message or a page of messages.
    ///
    /// `MessageTarget::Single` always issues the remote read, even on a
    /// cache hit; the cache is consulted only to decide whether to
    /// overwrite. With `overwrite` the cached entity's content is
    /// refreshed in place (same `Arc`, so external holders see it).
    /// `MessageTarget::Batch` inserts every returned record into the
    /// cache and accumulates them, in response order, into a
    /// [`MessageCollection`]. `overwrite` applies per record.
    ///
    /// Transport failures propagate unchanged; a failed batch caches
    /// nothing.
    pub async fn fetch(
        &self,
        target: impl Into<MessageTarget>,
        overwrite: bool,
    ) -> Result<Fetched> {
        match target.into() {
            MessageTarget::Single(id) => {
                Ok(Fetched::Single(self.fetch_single(id, overwrite).await?))
            }
            MessageTarget::Batch(query) => {
                Ok(Fetched::Batch(self.fetch_batch(&query, overwrite).await?))
            }
        }
    }

    /// Fetches a single message by id, never overwriting a cached entity.
    pub async fn fetch_message(&self, id: impl Into<MessageId>) -> Result<SharedMessage> {
        self.fetch_single(id.into(), false).await
    }

    /// Fetches a single message by id with explicit overwrite behavior.
    pub async fn fetch_message_with(
        &self,
        id: impl Into<MessageId>,
        overwrite: bool,
    ) -> Result<SharedMessage> {
        self.fetch_single(id.into(), overwrite).await
    }

    /// Fetches a page of messages matching `query`.
    pub async fn fetch_messages(&self, query: FetchQuery) -> Result<MessageCollection> {
        self.fetch_batch(&query, false).await
    }

    // == Fetch Pinned ==
    /// Fetches the channel's pinned messages.
    ///
    /// Distinct endpoint, no query refinements, same accumulation
    /// semantics as a batch fetch.
    pub async fn fetch_pinned(&self) -> Result<MessageCollection> {
        let records = self.transport.pinned_messages(&self.channel_id).await?;
        debug!(channel = %self.channel_id, count = records.len(), "fetched pinned messages");
        Ok(self.accumulate(records, false))
    }

    async fn fetch_single(&self, id: MessageId, overwrite: bool) -> Result<SharedMessage> {
        let raw = self.transport.message(&self.channel_id, &id).await?;
        debug!(channel = %self.channel_id, %id, overwrite, "fetched message");
        Ok(self.add(raw, overwrite))
    }

    async fn fetch_batch(&self, query: &FetchQuery, overwrite: bool) -> Result<MessageCollection> {
        let records = self.transport.messages(&self.channel_id, query).await?;
        debug!(channel = %self.channel_id, count = records.len(), "fetched message page");
        Ok(self.accumulate(records, overwrite))
    }

    /// Merges records into the cache, in order, accumulating the results.
    fn accumulate(&self, records: Vec<RawMessage>, overwrite: bool) -> MessageCollection {
        let mut collection = MessageCollection::new();
        for raw in records {
            let id = raw.id.clone();
            let message = self.add(raw, overwrite);
            collection.insert(id, message);
        }
        collection
    }

    // == Add ==
    /// Merges one wire record into the cache.
    ///
    /// A cached entity wins on identity: it is returned as-is, or patched
    /// in place when `overwrite` is set. A new record is constructed with
    /// this manager's channel as its owning context and inserted, subject
    /// to the capacity policy. With a disabled cache the entity is still
    /// constructed and returned, just never retained.
    pub fn add(&self, raw: RawMessage, overwrite: bool) -> SharedMessage {
        let mut cache = self.cache.write();
        if let Some(existing) = cache.get(&raw.id) {
            if overwrite {
                existing.write().patch(raw);
            }
            return existing;
        }

        let id = raw.id.clone();
        let message = Message::from_raw(raw, self.channel_id.clone()).into_shared();
        cache.insert(id, message.clone());
        message
    }

    // == Resolve ==
    /// Resolves an entity-or-id input to the canonical cached entity.
    ///
    /// Pure cache read: an already-materialized message is returned as-is,
    /// an identifier is looked up in the cache. Never fetches.
    pub fn resolve(&self, input: impl Into<MessageResolvable>) -> Option<SharedMessage> {
        match input.into() {
            MessageResolvable::Message(message) => Some(message),
            MessageResolvable::Id(id) => self.cache.read().get(&id),
        }
    }

    /// Resolves an entity-or-id input to its identifier.
    ///
    /// Infallible for the typed inputs: a message carries its id, an id is
    /// returned as given. Never consults the transport.
    pub fn resolve_id(&self, input: impl Into<MessageResolvable>) -> MessageId {
        match input.into() {
            MessageResolvable::Message(message) => message.read().id().clone(),
            MessageResolvable::Id(id) => id,
        }
    }

    // == Cache Accessors ==
    /// The channel this manager caches messages for.
    pub fn channel_id(&self) -> &ChannelId {
        &self.channel_id
    }

    /// Returns the cached message for `id`, if retained.
    pub fn cached(&self, id: &MessageId) -> Option<SharedMessage> {
        self.cache.read().get(id)
    }

    /// Removes a message from the cache. Absent ids are not an error.
    pub fn remove(&self, id: &MessageId) -> Option<SharedMessage> {
        self.cache.write().remove(id)
    }

    /// Number of currently cached messages.
    pub fn len(&self) -> usize {
        self.cache.read().len()
    }

    /// Returns true if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.cache.read().is_empty()
    }

    /// Replaces the cache capacity, trimming oldest entries if lowered.
    pub fn set_capacity(&self, capacity: Capacity) {
        self.cache.write().set_capacity(capacity);
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::Utc;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

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

    /// In-memory transport with programmable responses and call counters.
    #[derive(Default)]
    struct MockTransport {
        singles: Mutex<HashMap<String, RawMessage>>,
        page: Mutex<Vec<RawMessage>>,
        pins: Mutex<Vec<RawMessage>>,
        fail: Mutex<bool>,
        calls: AtomicUsize,
    }

    impl MockTransport {
        fn put_single(&self, record: RawMessage) {
            self.singles.lock().insert(record.id.to_string(), record);
        }

        fn set_page(&self, records: Vec<RawMessage>) {
            *self.page.lock() = records;
        }

        fn set_pins(&self, records: Vec<RawMessage>) {
            *self.pins.lock() = records;
        }

        fn fail_next(&self) {
            *self.fail.lock() = true;
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn check_fail(&self) -> Result<()> {
            if std::mem::take(&mut *self.fail.lock()) {
                return Err(Error::Api {
                    status: 500,
                    message: "mock failure".to_string(),
                });
            }
            Ok(())
        }
    }

    #[async_trait::async_trait]
    impl Transport for MockTransport {
        async fn message(&self, channel: &ChannelId, id: &MessageId) -> Result<RawMessage> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail()?;
            self.singles
                .lock()
                .get(&id.to_string())
                .cloned()
                .ok_or_else(|| Error::NotFound {
                    channel: channel.clone(),
                    message: id.clone(),
                })
        }

        async fn messages(
            &self,
            _channel: &ChannelId,
            _query: &FetchQuery,
        ) -> Result<Vec<RawMessage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail()?;
            Ok(self.page.lock().clone())
        }

        async fn pinned_messages(&self, _channel: &ChannelId) -> Result<Vec<RawMessage>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.check_fail()?;
            Ok(self.pins.lock().clone())
        }
    }

    fn manager(capacity: Capacity) -> (MessageManager<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(MockTransport::default());
        let manager = MessageManager::new("c1".into(), transport.clone(), capacity);
        (manager, transport)
    }

    #[tokio::test]
    async fn test_fetch_single_inserts_into_cache() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.put_single(raw("m1", "hello"));

        let fetched = manager.fetch_message("m1").await.unwrap();

        assert_eq!(fetched.read().content, "hello");
        assert_eq!(manager.len(), 1);
        let cached = manager.cached(&"m1".into()).unwrap();
        assert!(Arc::ptr_eq(&cached, &fetched));
    }

    #[tokio::test]
    async fn test_refetch_without_overwrite_keeps_original() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.put_single(raw("m1", "hello"));

        let first = manager.fetch_message("m1").await.unwrap();

        // Remote content changed, but without overwrite the cached
        // entity stays stale and keeps its identity
        transport.put_single(raw("m1", "edited"));
        let second = manager.fetch_message("m1").await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.read().content, "hello");
        assert_eq!(manager.len(), 1);
        // The remote read still happened on both fetches
        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn test_refetch_with_overwrite_patches_in_place() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.put_single(raw("m1", "hello"));

        let first = manager.fetch_message("m1").await.unwrap();

        transport.put_single(raw("m1", "edited"));
        let second = manager.fetch_message_with("m1", true).await.unwrap();

        // Identity preserved, content refreshed - external holders of
        // `first` observe the new content
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.read().content, "edited");
        assert_eq!(manager.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_batch_preserves_response_order() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.set_page(vec![raw("m3", "c"), raw("m2", "b"), raw("m1", "a")]);

        let page = manager
            .fetch_messages(FetchQuery::new().limit(3))
            .await
            .unwrap();

        let ids: Vec<String> = page.keys().map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["m3", "m2", "m1"]);
        assert_eq!(manager.len(), 3);
        for id in ["m1", "m2", "m3"] {
            assert!(manager.cached(&id.into()).is_some());
        }
    }

    #[tokio::test]
    async fn test_fetch_batch_reuses_cached_identity() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.put_single(raw("m2", "original"));
        let existing = manager.fetch_message("m2").await.unwrap();

        transport.set_page(vec![raw("m3", "c"), raw("m2", "changed"), raw("m1", "a")]);
        let page = manager.fetch_messages(FetchQuery::new()).await.unwrap();

        let from_page = page.get(&"m2".into()).unwrap();
        assert!(Arc::ptr_eq(&existing, from_page));
        // Without overwrite the cached content wins
        assert_eq!(from_page.read().content, "original");
    }

    #[tokio::test]
    async fn test_fetch_tagged_variants() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.put_single(raw("m1", "hello"));
        transport.set_page(vec![raw("m2", "b"), raw("m1", "hello")]);

        match manager.fetch("m1", false).await.unwrap() {
            Fetched::Single(message) => assert_eq!(message.read().content, "hello"),
            Fetched::Batch(_) => panic!("expected single result"),
        }

        match manager.fetch(FetchQuery::new().limit(2), false).await.unwrap() {
            Fetched::Batch(page) => assert_eq!(page.len(), 2),
            Fetched::Single(_) => panic!("expected batch result"),
        }
    }

    #[tokio::test]
    async fn test_fetch_pinned() {
        let (manager, transport) = manager(Capacity::Limit(10));
        let mut pinned = raw("m9", "pinned");
        pinned.pinned = true;
        transport.set_pins(vec![pinned, raw("m4", "also pinned")]);

        let pins = manager.fetch_pinned().await.unwrap();

        let ids: Vec<String> = pins.keys().map(|k| k.to_string()).collect();
        assert_eq!(ids, vec!["m9", "m4"]);
        assert_eq!(manager.len(), 2);
    }

    #[tokio::test]
    async fn test_disabled_cache_still_returns_entities() {
        let (manager, transport) = manager(Capacity::Limit(0));
        transport.put_single(raw("m1", "hello"));
        transport.set_page(vec![raw("m2", "b"), raw("m3", "c")]);

        let single = manager.fetch_message("m1").await.unwrap();
        let page = manager.fetch_messages(FetchQuery::new()).await.unwrap();

        assert_eq!(single.read().content, "hello");
        assert_eq!(page.len(), 2);
        // Nothing was retained
        assert_eq!(manager.len(), 0);
        assert!(manager.cached(&"m1".into()).is_none());
        assert!(manager.cached(&"m2".into()).is_none());
    }

    #[tokio::test]
    async fn test_capacity_applies_to_batch_inserts() {
        let (manager, transport) = manager(Capacity::Limit(2));
        transport.set_page(vec![raw("m1", "a"), raw("m2", "b"), raw("m3", "c")]);

        let page = manager.fetch_messages(FetchQuery::new()).await.unwrap();

        // The collection holds everything; the cache keeps the newest two
        assert_eq!(page.len(), 3);
        assert_eq!(manager.len(), 2);
        assert!(manager.cached(&"m1".into()).is_none());
        assert!(manager.cached(&"m2".into()).is_some());
        assert!(manager.cached(&"m3".into()).is_some());
    }

    #[tokio::test]
    async fn test_resolve_is_pure() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.put_single(raw("m1", "hello"));
        let cached = manager.fetch_message("m1").await.unwrap();
        let calls_before = transport.call_count();
        let len_before = manager.len();

        // Cached id resolves to the canonical entity
        let resolved = manager.resolve("m1").unwrap();
        assert!(Arc::ptr_eq(&resolved, &cached));

        // Uncached id resolves to absent, materialized entity to itself
        assert!(manager.resolve("missing").is_none());
        let direct = manager.resolve(cached.clone()).unwrap();
        assert!(Arc::ptr_eq(&direct, &cached));

        // resolve_id round-trips both forms
        assert_eq!(manager.resolve_id("m1"), "m1".into());
        assert_eq!(manager.resolve_id(cached.clone()), "m1".into());

        // No fetches, no cache mutation
        assert_eq!(transport.call_count(), calls_before);
        assert_eq!(manager.len(), len_before);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_and_caches_nothing() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.set_page(vec![raw("m1", "a")]);
        transport.fail_next();

        let result = manager.fetch_messages(FetchQuery::new()).await;

        assert!(matches!(result, Err(Error::Api { status: 500, .. })));
        assert_eq!(manager.len(), 0);
    }

    #[tokio::test]
    async fn test_fetch_missing_message_surfaces_not_found() {
        let (manager, _transport) = manager(Capacity::Limit(10));

        let result = manager.fetch_message("ghost").await;

        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert_eq!(manager.len(), 0);
    }

    #[tokio::test]
    async fn test_remove_and_set_capacity() {
        let (manager, transport) = manager(Capacity::Limit(10));
        transport.set_page(vec![raw("m1", "a"), raw("m2", "b"), raw("m3", "c")]);
        manager.fetch_messages(FetchQuery::new()).await.unwrap();

        assert!(manager.remove(&"m2".into()).is_some());
        assert!(manager.remove(&"m2".into()).is_none());
        assert_eq!(manager.len(), 2);

        manager.set_capacity(Capacity::Limit(1));
        assert_eq!(manager.len(), 1);
        assert!(manager.cached(&"m3".into()).is_some());
    }
}
