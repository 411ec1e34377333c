//! A subscriber which survives disconnects.
//!
//! [ReliableSubscriber::run] keeps a stream open against a [ChatService]
//! until cancelled. It remembers the highest id it has handed to the
//! callback and reconnects from there, so every message reaches the callback
//! at most once and in id order. A message evicted by retention while the
//! subscriber was away is not recovered.

use std::future::Future;

use futures::StreamExt;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::{
    client::{
        backoff::{ExponentialBackoff, RetryBackoff},
        clock::{Clock, TokioClock},
        ChatService,
    },
    Message,
};

pub struct ReliableSubscriber<S, B = ExponentialBackoff, C = TokioClock> {
    service: S,
    backoff: B,
    clock: C,
}

impl<S: ChatService> ReliableSubscriber<S> {
    /// A subscriber with the default backoff and the tokio timer.
    pub fn with_defaults(service: S) -> Self {
        Self::new(service, ExponentialBackoff::default(), TokioClock)
    }
}

impl<S, B, C> ReliableSubscriber<S, B, C>
where
    S: ChatService,
    B: RetryBackoff,
    C: Clock,
{
    pub fn new(service: S, backoff: B, clock: C) -> Self {
        Self {
            service,
            backoff,
            clock,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Deliver every message after `since_id` to `on_message` until `cancel`
    /// fires, reconnecting with backoff whenever the stream fails, ends or
    /// can't be opened. Returns the id of the last delivered message (or
    /// `since_id` if there was none).
    ///
    /// `on_message` is awaited before the next message is taken and is
    /// never interrupted by cancellation.
    pub async fn run<F, Fut>(
        &mut self,
        since_id: i64,
        mut on_message: F,
        cancel: CancellationToken,
    ) -> i64
    where
        F: FnMut(Message) -> Fut,
        Fut: Future<Output = ()>,
    {
        let mut last_id = since_id;
        self.backoff.reset();
        info!("Reliable subscriber starting from {}", last_id);

        while !cancel.is_cancelled() {
            let opened = select! {
                biased;
                _ = cancel.cancelled() => None,
                opened = self.service.subscribe(last_id) => Some(opened),
            };
            match opened {
                None => break,
                Some(Err(e)) => warn!("Failed to subscribe from {}: {}", last_id, e),
                Some(Ok(mut stream)) => {
                    debug!("Subscribed from {}", last_id);
                    loop {
                        let next = select! {
                            biased;
                            _ = cancel.cancelled() => None,
                            next = stream.next() => Some(next),
                        };
                        match next {
                            None => {
                                info!("Reliable subscriber cancelled at {}", last_id);
                                return last_id;
                            }
                            Some(Some(Ok(message))) => {
                                if message.id <= last_id {
                                    debug!("Skipping already delivered message {}", message.id);
                                    continue;
                                }
                                let id = message.id;
                                on_message(message).await;
                                last_id = id;
                                self.backoff.reset();
                            }
                            Some(Some(Err(e))) => {
                                warn!("Stream from {} failed: {}", last_id, e);
                                break;
                            }
                            Some(None) => {
                                warn!("Stream from {} ended", last_id);
                                break;
                            }
                        }
                    }
                }
            }

            let delay = self.backoff.next_delay();
            debug!("Reconnecting in {:?}", delay);
            let waited = select! {
                biased;
                _ = cancel.cancelled() => false,
                _ = self.clock.delay(delay) => true,
            };
            if !waited {
                break;
            }
        }

        info!("Reliable subscriber cancelled at {}", last_id);
        last_id
    }
}
