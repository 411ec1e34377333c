//! The boundary between the message store and whatever keeps messages
//! durable.

use std::error::Error;

use async_trait::async_trait;

use crate::Message;

/// The ids currently available for backlog reads (inclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedRange {
    pub oldest: i64,
    pub newest: i64,
}

impl RetainedRange {
    /// Whether a subscriber resuming from `since_id` has lost messages to
    /// eviction.
    pub fn has_gap_after(&self, since_id: i64) -> bool {
        since_id.saturating_add(1) < self.oldest
    }
}

/// This is the interface for persisting messages.
///
/// Implementations don't need to be safe against concurrent inserts: the
/// [MessageStore](crate::MessageStore) serializes every call to
/// [insert](MessagePersistence::insert).
#[async_trait]
pub trait MessagePersistence: Send + Sync + 'static {
    /// An error occurring from an operation.
    type Error: Error + Send + Sync + 'static;

    /// Durably append a message, assigning the next id and the creation
    /// time, and evict the oldest messages beyond the retention window in
    /// the same step.
    async fn insert(&self, sender: &str, text: &str) -> Result<Message, Self::Error>;

    /// Retained messages with `id > since_id` in ascending id order, at
    /// most `limit` of them.
    async fn read_since(&self, since_id: i64, limit: usize) -> Result<Vec<Message>, Self::Error>;

    /// Bounds of the retained ids, or None if nothing is stored.
    async fn retained_range(&self) -> Result<Option<RetainedRange>, Self::Error>;

    /// How many of the most recent messages are kept.
    fn retention(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gap_detection() {
        let range = RetainedRange {
            oldest: 10,
            newest: 20,
        };
        assert!(!range.has_gap_after(9));
        assert!(!range.has_gap_after(15));
        assert!(range.has_gap_after(8));
        assert!(range.has_gap_after(0));
        assert!(!range.has_gap_after(i64::MAX));
    }
}
