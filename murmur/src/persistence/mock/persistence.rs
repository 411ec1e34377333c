use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    persistence::{
        mock::error::MockPersistenceError, InMemoryPersistence, MessagePersistence, RetainedRange,
    },
    Message,
};

/// An in-memory persistence service whose operations can be made to fail
/// on demand. Don't use this for any real-life purpose.
#[derive(Debug, Default)]
pub struct MockPersistence {
    inner: InMemoryPersistence,
    failing_inserts: AtomicUsize,
    failing_reads: AtomicUsize,
    reads: AtomicUsize,
}

impl MockPersistence {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_retention(retention: usize) -> Self {
        Self {
            inner: InMemoryPersistence::with_retention(retention),
            ..Default::default()
        }
    }

    /// Fail the next `count` inserts.
    pub fn fail_next_inserts(&self, count: usize) {
        self.failing_inserts.store(count, Ordering::SeqCst);
    }

    /// Fail the next `count` backlog reads.
    pub fn fail_next_reads(&self, count: usize) {
        self.failing_reads.store(count, Ordering::SeqCst);
    }

    /// How many backlog reads have been attempted.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn take_failure(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl MessagePersistence for MockPersistence {
    type Error = MockPersistenceError;

    async fn insert(&self, sender: &str, text: &str) -> Result<Message, Self::Error> {
        if Self::take_failure(&self.failing_inserts) {
            return Err(MockPersistenceError::InsertFailed);
        }
        self.inner.insert(sender, text).await.map_err(|never| match never {})
    }

    async fn read_since(&self, since_id: i64, limit: usize) -> Result<Vec<Message>, Self::Error> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if Self::take_failure(&self.failing_reads) {
            return Err(MockPersistenceError::ReadFailed(since_id));
        }
        self.inner
            .read_since(since_id, limit)
            .await
            .map_err(|never| match never {})
    }

    async fn retained_range(&self) -> Result<Option<RetainedRange>, Self::Error> {
        self.inner.retained_range().await.map_err(|never| match never {})
    }

    fn retention(&self) -> usize {
        self.inner.retention()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn injected_failures_are_consumed() {
        let persistence = MockPersistence::new();
        persistence.fail_next_inserts(1);
        assert!(persistence.insert("A", "one").await.is_err());
        assert_eq!(persistence.insert("A", "one").await.unwrap().id, 1);

        persistence.fail_next_reads(2);
        assert!(persistence.read_since(0, 10).await.is_err());
        assert!(persistence.read_since(0, 10).await.is_err());
        assert_eq!(persistence.read_since(0, 10).await.unwrap().len(), 1);
        assert_eq!(persistence.reads(), 3);
    }
}
