//! The [MessageStore] owns the ordered, retention-bounded log of messages
//! and is the only place ids are issued.
//!
//! A single exclusive section orders two operations against each other:
//!
//! - [append](MessageStore::append): persist (assigning the id and evicting
//! beyond the retention window), then publish to the [Broadcaster].
//! - [subscribe](MessageStore::subscribe): read the first backlog batch,
//! then register a live queue.
//!
//! A message is therefore either committed before a registration (and
//! visible to its backlog reads) or published after it (and delivered to
//! its queue), never lost in between. A message can show up in both when a
//! session pages its backlog after registering; sessions drop those by id.
//!
//! Example usage:
//!
//! ``` no_run
//! # use murmur::{InMemoryPersistence, MessageStore};
//! # async fn inner() -> Result<(), murmur::ChatError> {
//! let store = MessageStore::open(InMemoryPersistence::new()).await?;
//! let message = store.append("A", "one").await?;
//! assert_eq!(message.id, 1);
//! let backlog = store.snapshot_backlog(0).await?;
//! assert_eq!(backlog, vec![message]);
//! # Ok(())
//! # }
//! ```

mod broadcaster;

use std::sync::Arc;

pub use broadcaster::{Broadcaster, SubscriberId, Subscription};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    config::StoreConfig,
    error::{ChatError, ChatResult},
    message::validate,
    persistence::{MessagePersistence, RetainedRange},
    Message,
};

/// The result of opening a live registration: the first backlog batch after
/// the cursor, the newest id at the moment of registration and the queue
/// receiving everything appended afterwards.
#[derive(Debug)]
pub struct Handoff {
    pub backlog: Vec<Message>,
    pub head: i64,
    pub subscription: Subscription,
}

struct StoreInner<P> {
    persistence: P,
    /// The exclusive section. Holds the id of the newest appended message.
    head: Mutex<i64>,
    broadcaster: Arc<Broadcaster>,
    batch_size: usize,
}

impl<P: MessagePersistence> StoreInner<P> {
    async fn append_locked(&self, sender: &str, text: &str) -> ChatResult<Message> {
        let mut head = self.head.lock().await;
        let message = self
            .persistence
            .insert(sender, text)
            .await
            .map_err(ChatError::persistence)?;
        *head = message.id;
        let delivered = self.broadcaster.publish(&message);
        debug!(
            "Appended message {} from {:?} ({} live subscribers)",
            message.id, message.sender, delivered
        );
        Ok(message)
    }
}

/// Cheaply cloneable handle to a shared message log.
pub struct MessageStore<P> {
    inner: Arc<StoreInner<P>>,
}

impl<P> Clone for MessageStore<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<P: MessagePersistence> MessageStore<P> {
    /// Open a store with the default backlog batch size.
    pub async fn open(persistence: P) -> ChatResult<Self> {
        Self::open_with(persistence, &StoreConfig::default()).await
    }

    /// Open a store, recovering the newest id from the persistence layer.
    ///
    /// The retention window is a property of the persistence layer; only
    /// the batch size of `config` applies here. A differing
    /// `config.retention` is logged and otherwise ignored.
    pub async fn open_with(persistence: P, config: &StoreConfig) -> ChatResult<Self> {
        if config.retention != persistence.retention() {
            warn!(
                "Ignoring configured retention {}, the persistence layer keeps {}",
                config.retention,
                persistence.retention()
            );
        }
        let head = persistence
            .retained_range()
            .await
            .map_err(ChatError::persistence)?
            .map(|range| range.newest)
            .unwrap_or(0);
        debug!("Opened message store at head {}", head);
        Ok(Self {
            inner: Arc::new(StoreInner {
                persistence,
                head: Mutex::new(head),
                broadcaster: Arc::new(Broadcaster::new()),
                batch_size: config.batch_size.max(1),
            }),
        })
    }

    /// Validate, persist and publish a message.
    ///
    /// Fails with [ChatError::InvalidInput] before touching the log if the
    /// message breaks the acceptance rules.
    pub async fn append(
        &self,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> ChatResult<Message> {
        let (sender, text) = (sender.into(), text.into());
        validate(&sender, &text)?;
        let inner = Arc::clone(&self.inner);
        // insert and publish must not be split by the caller being dropped
        tokio::spawn(async move { inner.append_locked(&sender, &text).await }).await?
    }

    /// Retained messages after `since_id` in ascending order, at most one
    /// batch of them. Call again from the last id returned while a full
    /// batch comes back.
    pub async fn snapshot_backlog(&self, since_id: i64) -> ChatResult<Vec<Message>> {
        self.inner
            .persistence
            .read_since(since_id, self.inner.batch_size)
            .await
            .map_err(ChatError::persistence)
    }

    /// Atomically read the first backlog batch after `since_id` and
    /// register a live queue.
    pub async fn subscribe(&self, since_id: i64) -> ChatResult<Handoff> {
        let head = self.inner.head.lock().await;
        let backlog = self.snapshot_backlog(since_id).await?;
        let subscription = self.inner.broadcaster.register();
        Ok(Handoff {
            backlog,
            head: *head,
            subscription,
        })
    }

    /// The id of the newest appended message, or 0.
    pub async fn head(&self) -> i64 {
        *self.inner.head.lock().await
    }

    /// Bounds of the ids still available for backlog reads.
    pub async fn retained_range(&self) -> ChatResult<Option<RetainedRange>> {
        self.inner
            .persistence
            .retained_range()
            .await
            .map_err(ChatError::persistence)
    }

    /// How many of the most recent messages the persistence layer keeps.
    pub fn retention(&self) -> usize {
        self.inner.persistence.retention()
    }

    pub fn batch_size(&self) -> usize {
        self.inner.batch_size
    }

    /// Number of open live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.inner.broadcaster.subscriber_count()
    }

    #[cfg(test)]
    pub(crate) fn persistence(&self) -> &P {
        &self.inner.persistence
    }
}
