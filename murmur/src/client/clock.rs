use std::time::Duration;

use async_trait::async_trait;

/// Waits between reconnect attempts. Swappable so tests can observe delays
/// without sleeping.
#[async_trait]
pub trait Clock: Send + Sync {
    async fn delay(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    async fn delay(&self, duration: Duration) {
        tokio::time::sleep(duration).await
    }
}
