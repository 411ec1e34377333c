//! Follow the room and post every line typed on stdin.
//!
//! ```text
//! MURMUR_ENDPOINT=http://127.0.0.1:7755 cargo run --example chat_client -- Alice
//! ```

use demos::init_tracing;
use murmur::{
    ChatService, ClientConfig, ExponentialBackoff, ReliableSubscriber, RemoteService, TokioClock,
};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let sender = std::env::args().nth(1).unwrap_or_else(|| "anonymous".to_string());
    let config = ClientConfig::from_env()?;
    let service = RemoteService::connect_lazy(config.endpoint.clone())?;
    info!("Chatting on {} as {}", config.endpoint, sender);

    let cancel = CancellationToken::new();
    let follower = tokio::spawn({
        let mut subscriber = ReliableSubscriber::new(
            service.clone(),
            ExponentialBackoff::from(config.backoff),
            TokioClock,
        );
        let cancel = cancel.clone();
        async move {
            subscriber
                .run(0, |message| async move { println!("{}", message) }, cancel)
                .await
        }
    });

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            line = lines.next_line() => match line? {
                None => break,
                Some(line) if line.trim().is_empty() => {}
                Some(line) => {
                    if let Err(e) = service.send_message(&sender, &line).await {
                        warn!("Message not sent: {}", e);
                    }
                }
            },
        }
    }

    cancel.cancel();
    let last_id = follower.await?;
    info!("Stopped after message {}", last_id);
    Ok(())
}
