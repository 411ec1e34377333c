use demos::{connect_pool, init_tracing};
use murmur::{sqlite::SqliteMessagePersistence, ChatServer, MessageStore, ServerConfig};
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::from_env()?;
    let pool = connect_pool(&config.database_url).await?;
    let persistence = SqliteMessagePersistence::with_retention(pool, config.store.retention);
    let store = MessageStore::open_with(persistence, &config.store).await?;
    info!(
        "Serving {} (head {}, retention {})",
        config.database_url,
        store.head().await,
        config.store.retention
    );

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, shutting down");
            }
            shutdown.cancel();
        }
    });

    ChatServer::new(store).serve(config.bind, shutdown).await?;
    Ok(())
}
