//! Everything a participant needs to talk to a chat room.
//!
//! [ChatService] is the seam between callers and the room. The composition
//! root picks the implementation:
//!
//! - [LoopbackService]: the room lives in this process. Calls go straight to
//! a [MessageStore](crate::MessageStore).
//! - [RemoteService]: the room is a [ChatServer](crate::ChatServer)
//! reachable over gRPC.
//!
//! Streams handed out by either implementation end or fail whenever the
//! connection does. [ReliableSubscriber] turns that into an uninterrupted,
//! deduplicated sequence by reconnecting from the last delivered id.
//!
//! Example usage:
//!
//! ``` no_run
//! # use murmur::{ExponentialBackoff, ReliableSubscriber, RemoteService, TokioClock};
//! # use tokio_util::sync::CancellationToken;
//! # async fn inner() -> Result<(), murmur::ChatError> {
//! let service = RemoteService::connect_lazy("http://127.0.0.1:7755")?;
//! let mut subscriber =
//!     ReliableSubscriber::new(service, ExponentialBackoff::default(), TokioClock);
//! let cancel = CancellationToken::new();
//! let last_id = subscriber
//!     .run(0, |message| async move { println!("{}", message) }, cancel)
//!     .await;
//! # Ok(())
//! # }
//! ```

mod backoff;
mod clock;
mod loopback;
mod reliable;
mod remote;

use std::sync::Arc;

use async_trait::async_trait;
pub use backoff::{ExponentialBackoff, RetryBackoff};
pub use clock::{Clock, TokioClock};
pub use loopback::LoopbackService;
pub use reliable::ReliableSubscriber;
pub use remote::RemoteService;

use crate::{error::ChatResult, server::MessageStream, Message};

/// Sending to and following a chat room, wherever it lives.
#[async_trait]
pub trait ChatService: Send + Sync {
    /// Append a message to the room. Returns it as stored.
    async fn send_message(&self, sender: &str, text: &str) -> ChatResult<Message>;

    /// Open a stream of every retained message after `since_id`, followed by
    /// live messages. The stream ends or fails when the connection does.
    async fn subscribe(&self, since_id: i64) -> ChatResult<MessageStream<Message>>;
}

#[async_trait]
impl<S: ChatService + ?Sized> ChatService for Arc<S> {
    async fn send_message(&self, sender: &str, text: &str) -> ChatResult<Message> {
        (**self).send_message(sender, text).await
    }

    async fn subscribe(&self, since_id: i64) -> ChatResult<MessageStream<Message>> {
        (**self).subscribe(since_id).await
    }
}
