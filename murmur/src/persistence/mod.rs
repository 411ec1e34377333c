//! # Functionality to store and retrieve Messages
//!
//! The persistence layer is the durable half of the
//! [MessageStore](crate::MessageStore). It assigns ids, stamps creation
//! times and applies the retention window; the store wraps it with the
//! exclusive section that keeps appends and live registrations ordered.
//!
//! ## Retention
//!
//! Every backend keeps at most a fixed number of the most recent messages.
//! Eviction happens in the same step as the insert, so a reader never
//! observes more than the window. Evicted messages are gone for good: a
//! subscriber which was away for longer than the window resumes at the
//! oldest retained id. Use
//! [retained_range](MessagePersistence::retained_range) to detect that.
//!
//! ## Backends
//!
//! - [InMemoryPersistence]: process-local, used for loopback setups and
//! tests.
//! - `sqlite`: durable, backed by sqlx. Enabled by default.
//! - `mock`: in-memory with injectable failures. Requires the `mocks`
//! feature outside of this crate's tests.

#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(any(test, feature = "mocks"))]
pub mod mock;

mod memory;
mod message_persistence;

pub use memory::InMemoryPersistence;
pub use message_persistence::{MessagePersistence, RetainedRange};
