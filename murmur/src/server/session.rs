//! A [StreamingSession] serves one subscriber: it replays the retained
//! backlog after the subscriber's cursor and then follows live messages,
//! without a gap or a duplicate at the seam.
//!
//! ```text
//! Starting -> Backlog -> Live -> Closed
//!     \          \                ^
//!      +----------+---- error ----+
//! ```
//!
//! The session registers its live queue in the same exclusive section as
//! its first backlog read (see [MessageStore::subscribe]). If the backlog is
//! longer than one batch, the remaining pages are read after registration,
//! so a message may arrive both as backlog and live. Backlog pages are
//! capped at the head seen at registration: anything newer is already in
//! the live queue. The session keeps a high-water mark of the ids it has
//! emitted and drops anything at or below it.
//!
//! Errors are not recovered here. A failed backlog read is emitted once
//! and closes the session; the subscriber reconnects from the highest id it
//! actually received.

use std::collections::VecDeque;

use async_stream::stream;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    error::ChatResult,
    persistence::MessagePersistence,
    server::MessageStream,
    store::{Handoff, MessageStore, Subscription},
    Message,
};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Starting,
    Backlog,
    Live,
    Closed,
}

pub struct StreamingSession<P> {
    store: MessageStore<P>,
    state: SessionState,
    /// The cursor this session was opened with.
    since_id: i64,
    /// The highest id emitted so far.
    high_water: i64,
    /// The newest id at registration time. Backlog paging stops here.
    head: i64,
    /// Backlog messages read but not yet emitted.
    pending: VecDeque<Message>,
    /// Whether the last backlog read returned a full batch.
    more_backlog: bool,
    subscription: Option<Subscription>,
    cancel: CancellationToken,
}

impl<P: MessagePersistence> StreamingSession<P> {
    /// Create a session for a subscriber whose last accepted message is
    /// `since_id`. Nothing happens until the first call to
    /// [next](StreamingSession::next).
    pub fn new(store: MessageStore<P>, since_id: i64, cancel: CancellationToken) -> Self {
        Self {
            store,
            state: SessionState::Starting,
            since_id,
            high_water: since_id,
            head: since_id,
            pending: VecDeque::new(),
            more_backlog: false,
            subscription: None,
            cancel,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The highest id emitted so far (or the starting cursor).
    pub fn high_water(&self) -> i64 {
        self.high_water
    }

    /// Drive the session as a stream. Dropping the stream releases the
    /// live registration.
    pub fn into_stream(mut self) -> MessageStream<Message> {
        Box::pin(stream! {
            while let Some(item) = self.next().await {
                yield item;
            }
        })
    }

    /// The next message for the subscriber, an error which closed the
    /// session, or None once the session is closed.
    pub async fn next(&mut self) -> Option<ChatResult<Message>> {
        loop {
            match self.state {
                SessionState::Starting => {
                    if let Err(e) = self.start().await {
                        self.close("failed to open");
                        return Some(Err(e));
                    }
                }
                SessionState::Backlog => {
                    if let Some(message) = self.pending.pop_front() {
                        if self.accept(&message) {
                            return Some(Ok(message));
                        }
                        continue;
                    }
                    if self.more_backlog && self.high_water < self.head {
                        if let Err(e) = self.read_backlog().await {
                            self.close("backlog read failed");
                            return Some(Err(e));
                        }
                    } else {
                        debug!("Session caught up at {}, going live", self.high_water);
                        self.state = SessionState::Live;
                    }
                }
                SessionState::Live => {
                    let subscription = self.subscription.as_mut()?;
                    let received = select! {
                        biased;
                        _ = self.cancel.cancelled() => None,
                        message = subscription.recv() => message,
                    };
                    match received {
                        Some(message) => {
                            if self.accept(&message) {
                                return Some(Ok(message));
                            }
                        }
                        None => {
                            self.close("cancelled or unregistered");
                            return None;
                        }
                    }
                }
                SessionState::Closed => return None,
            }
        }
    }

    async fn start(&mut self) -> ChatResult<()> {
        if self.since_id < 0 {
            warn!("Negative cursor {} treated as 0", self.since_id);
            self.since_id = 0;
            self.high_water = 0;
        }
        let Handoff {
            backlog,
            head,
            subscription,
        } = self.store.subscribe(self.since_id).await?;
        info!(
            "Session {:?} opened at {} (head {}, {} backlog messages in first batch)",
            subscription.id(),
            self.since_id,
            head,
            backlog.len()
        );
        self.head = head;
        self.subscription = Some(subscription);
        self.enqueue_backlog(backlog);
        self.state = SessionState::Backlog;
        Ok(())
    }

    async fn read_backlog(&mut self) -> ChatResult<()> {
        let backlog = self.store.snapshot_backlog(self.high_water).await?;
        self.enqueue_backlog(backlog);
        Ok(())
    }

    fn enqueue_backlog(&mut self, backlog: Vec<Message>) {
        let head = self.head;
        // a short page, or one reaching the head, is the last one
        self.more_backlog = backlog.len() >= self.store.batch_size()
            && backlog.last().map_or(false, |m| m.id < head);
        self.pending.extend(backlog.into_iter().take_while(|m| m.id <= head));
    }

    /// Advance the high-water mark if the message is new to this session.
    fn accept(&mut self, message: &Message) -> bool {
        if message.id > self.high_water {
            self.high_water = message.id;
            true
        } else {
            debug!(
                "Dropping message {} at or below high-water {}",
                message.id, self.high_water
            );
            false
        }
    }

    fn close(&mut self, reason: &str) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(subscription) = self.subscription.take() {
            info!(
                "Session {:?} closed at {}: {}",
                subscription.id(),
                self.high_water,
                reason
            );
        }
        self.pending.clear();
        self.state = SessionState::Closed;
    }
}
