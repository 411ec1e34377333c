use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    client::ChatService,
    error::ChatResult,
    persistence::MessagePersistence,
    server::{MessageStream, StreamingSession},
    store::MessageStore,
    Message,
};

/// A [ChatService] over a store in the same process.
pub struct LoopbackService<P> {
    store: MessageStore<P>,
    /// Parent of the cancellation token of every stream handed out since the
    /// last [disconnect_all](LoopbackService::disconnect_all).
    sessions: Arc<Mutex<CancellationToken>>,
}

impl<P> Clone for LoopbackService<P> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

impl<P: MessagePersistence> LoopbackService<P> {
    pub fn new(store: MessageStore<P>) -> Self {
        Self {
            store,
            sessions: Default::default(),
        }
    }

    pub fn store(&self) -> &MessageStore<P> {
        &self.store
    }

    /// End every open stream, as a server going away would. Later calls to
    /// [subscribe](ChatService::subscribe) work as before.
    pub fn disconnect_all(&self) {
        let previous = std::mem::take(&mut *self.sessions.lock());
        previous.cancel();
        info!("Disconnected all loopback streams");
    }
}

#[async_trait]
impl<P: MessagePersistence> ChatService for LoopbackService<P> {
    async fn send_message(&self, sender: &str, text: &str) -> ChatResult<Message> {
        self.store.append(sender, text).await
    }

    async fn subscribe(&self, since_id: i64) -> ChatResult<MessageStream<Message>> {
        let cancel = self.sessions.lock().child_token();
        Ok(StreamingSession::new(self.store.clone(), since_id, cancel).into_stream())
    }
}
