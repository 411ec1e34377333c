//! Fan-out of newly appended messages to every live streaming session.
//!
//! Each registration owns an unbounded queue. Publishing never waits on a
//! subscriber: a slow consumer only grows its own queue, and nothing is
//! ever dropped on its way to a registered session.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, trace};

use crate::Message;

/// Identifies one registration with a [Broadcaster].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

/// Tracks live subscribers and delivers published messages to each of them.
#[derive(Debug, Default)]
pub struct Broadcaster {
    subscribers: Mutex<HashMap<SubscriberId, UnboundedSender<Message>>>,
    next_id: AtomicU64,
}

impl Broadcaster {
    pub fn new() -> Self {
        Default::default()
    }

    /// Register a new live queue.
    ///
    /// Registration must happen inside the store's exclusive section to be
    /// ordered against appends; use
    /// [MessageStore::subscribe](crate::MessageStore::subscribe) rather than
    /// calling this directly.
    pub fn register(self: &Arc<Self>) -> Subscription {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = unbounded_channel();
        self.subscribers.lock().insert(id, sender);
        debug!("Registered subscriber {:?}", id);
        Subscription {
            id,
            receiver,
            broadcaster: Arc::clone(self),
        }
    }

    /// Deliver a message to every registered queue, returning how many
    /// received it. Queues whose receiver has gone away are pruned.
    pub fn publish(&self, message: &Message) -> usize {
        let mut subscribers = self.subscribers.lock();
        subscribers.retain(|id, sender| match sender.send(message.clone()) {
            Ok(()) => true,
            Err(_) => {
                debug!("Pruning closed subscriber {:?}", id);
                false
            }
        });
        trace!(
            "Published message {} to {} subscribers",
            message.id,
            subscribers.len()
        );
        subscribers.len()
    }

    /// Remove a registration. Returns whether it was still registered;
    /// calling this more than once is harmless.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.lock().remove(&id).is_some();
        if removed {
            debug!("Unregistered subscriber {:?}", id);
        }
        removed
    }

    /// Number of live registrations.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}

/// An ownership token for one live queue. Dropping it unregisters the
/// queue, so every exit path of a session releases its registration.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriberId,
    receiver: UnboundedReceiver<Message>,
    broadcaster: Arc<Broadcaster>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Wait for the next published message. Returns None once the
    /// registration has been removed and the queue is drained.
    pub async fn recv(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }

    /// Take a message if one is already queued.
    pub fn try_recv(&mut self) -> Option<Message> {
        self.receiver.try_recv().ok()
    }

    /// Unregister explicitly. Equivalent to dropping the handle.
    pub fn unregister(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.broadcaster.unregister(self.id);
    }
}
