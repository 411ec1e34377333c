use std::{collections::VecDeque, convert::Infallible};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    constants::RETENTION_LIMIT,
    message::now_millis,
    persistence::{MessagePersistence, RetainedRange},
    Message,
};

#[derive(Debug)]
struct Log {
    messages: VecDeque<Message>,
    next_id: i64,
}

/// A process-local message log. Nothing survives a restart, but ids,
/// ordering and retention behave exactly like the durable backends.
#[derive(Debug)]
pub struct InMemoryPersistence {
    log: Mutex<Log>,
    retention: usize,
}

impl InMemoryPersistence {
    pub fn new() -> Self {
        Self::with_retention(RETENTION_LIMIT)
    }

    /// Keep at most `retention` messages (at least one).
    pub fn with_retention(retention: usize) -> Self {
        let retention = retention.max(1);
        Self {
            log: Mutex::new(Log {
                messages: VecDeque::with_capacity(retention),
                next_id: 1,
            }),
            retention,
        }
    }
}

impl Default for InMemoryPersistence {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePersistence for InMemoryPersistence {
    type Error = Infallible;

    async fn insert(&self, sender: &str, text: &str) -> Result<Message, Self::Error> {
        let mut log = self.log.lock().await;
        let message = Message {
            id: log.next_id,
            sender: sender.to_string(),
            text: text.to_string(),
            created_at: now_millis(),
        };
        log.next_id += 1;
        log.messages.push_back(message.clone());
        while log.messages.len() > self.retention {
            log.messages.pop_front();
        }
        Ok(message)
    }

    async fn read_since(&self, since_id: i64, limit: usize) -> Result<Vec<Message>, Self::Error> {
        let log = self.log.lock().await;
        // ids are contiguous, so the first match can be found by offset
        let start = match log.messages.front() {
            Some(first) if since_id >= first.id => (since_id - first.id + 1) as usize,
            _ => 0,
        };
        Ok(log
            .messages
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn retained_range(&self) -> Result<Option<RetainedRange>, Self::Error> {
        let log = self.log.lock().await;
        Ok(log
            .messages
            .front()
            .zip(log.messages.back())
            .map(|(oldest, newest)| RetainedRange {
                oldest: oldest.id,
                newest: newest.id,
            }))
    }

    fn retention(&self) -> usize {
        self.retention
    }
}
