//! # Murmur
//!
//! Murmur is a resilient chat message stream. Many participants post short
//! text messages to a single room and follow everything posted, in order,
//! through disconnects and restarts, without losing or repeating a message.
//!
//! Three pieces make that work:
//!
//! - A [MessageStore] which issues strictly increasing ids, keeps a bounded
//! window of the most recent messages and fans every new message out to
//! the open live streams in the same step it commits it.
//! - A [StreamingSession] which replays everything a subscriber missed
//! (the backlog) and then switches to live delivery, with no gap and no
//! duplicate at the seam.
//! - A [ReliableSubscriber] which reconnects with backoff, resumes from the
//! last id it delivered and drops anything it has already seen.
//!
//! ## Getting Started
//!
//! Run a room in-process and follow it:
//!
//! ``` no_run
//! use murmur::{
//!     ChatService, InMemoryPersistence, LoopbackService, MessageStore, ReliableSubscriber,
//! };
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn inner() -> Result<(), murmur::ChatError> {
//! let store = MessageStore::open(InMemoryPersistence::new()).await?;
//! let service = LoopbackService::new(store);
//! service.send_message("Alice", "hello").await?;
//!
//! let cancel = CancellationToken::new();
//! let mut subscriber = ReliableSubscriber::with_defaults(service.clone());
//! // prints "[HH:MM] Alice: hello" and everything after it until cancelled
//! let last_id = subscriber
//!     .run(0, |message| async move { println!("{}", message) }, cancel)
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! ### Networking
//!
//! [ChatServer] exposes a store over gRPC (`chat.ChatApi`, see
//! `proto/chat.proto`) and [RemoteService] is the matching client. Both
//! sides of [ChatService] behave the same, so a [ReliableSubscriber] works
//! unchanged against either.
//!
//! ## Crate feature flags
//!
//! - `sqlite`: Durable persistence of the retention window in sqlite.
//! Enabled by default.
//! - `mocks`: Persistence with injectable failures, for testing.

pub(crate) mod constants;

pub mod client;
pub mod config;
mod error;
mod message;
mod persistence;
pub mod proto;
pub mod server;
pub mod store;

pub use client::{
    ChatService, Clock, ExponentialBackoff, LoopbackService, ReliableSubscriber, RemoteService,
    RetryBackoff, TokioClock,
};
pub use config::{BackoffConfig, ClientConfig, ConfigError, ServerConfig, StoreConfig};
pub use error::{ChatError, ChatResult, InvalidInput};
pub use message::{validate, Message};
pub use persistence::*;
pub use server::{ChatServer, MessageStream, SessionState, StreamingSession};
pub use store::{Broadcaster, Handoff, MessageStore, SubscriberId, Subscription};
