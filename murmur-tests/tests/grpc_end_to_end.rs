use std::{net::SocketAddr, time::Duration};

use futures_util::stream::StreamExt;
use murmur::{
    sqlite::{migrate, SqliteMessagePersistence},
    ChatError, ChatServer, ChatService, ExponentialBackoff, InMemoryPersistence,
    MessagePersistence, MessageStore, ReliableSubscriber, RemoteService, TokioClock,
};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio::{
    net::TcpListener,
    sync::mpsc::{unbounded_channel, UnboundedReceiver},
    task::JoinHandle,
    time::{sleep, timeout},
};
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tonic::Code;

const WAIT: Duration = Duration::from_secs(10);

struct RunningServer {
    address: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<Result<(), ChatError>>,
}

impl RunningServer {
    async fn stop(self) -> anyhow::Result<()> {
        self.shutdown.cancel();
        let served = timeout(WAIT, self.handle).await??;
        Ok(served?)
    }

    fn endpoint(&self) -> String {
        format!("http://{}", self.address)
    }
}

async fn start_server<P: MessagePersistence>(
    store: MessageStore<P>,
    address: SocketAddr,
) -> anyhow::Result<RunningServer> {
    let listener = TcpListener::bind(address).await?;
    let address = listener.local_addr()?;
    let shutdown = CancellationToken::new();
    let handle = tokio::spawn(
        ChatServer::new(store)
            .serve_with_incoming(TcpListenerStream::new(listener), shutdown.clone()),
    );
    Ok(RunningServer {
        address,
        shutdown,
        handle,
    })
}

async fn ephemeral_server<P: MessagePersistence>(
    store: MessageStore<P>,
) -> anyhow::Result<RunningServer> {
    start_server(store, "127.0.0.1:0".parse()?).await
}

async fn memory_store() -> MessageStore<InMemoryPersistence> {
    MessageStore::open(InMemoryPersistence::new()).await.unwrap()
}

async fn test_db_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

/// Spawn a reliable subscriber forwarding every delivered id.
fn follow(
    service: RemoteService,
    since_id: i64,
    cancel: CancellationToken,
) -> (JoinHandle<i64>, UnboundedReceiver<i64>) {
    let (sender, receiver) = unbounded_channel();
    let mut subscriber = ReliableSubscriber::new(
        service,
        ExponentialBackoff::new(Duration::from_millis(10), Duration::from_millis(100)),
        TokioClock,
    );
    let handle = tokio::spawn(async move {
        subscriber
            .run(
                since_id,
                move |message| {
                    let _ = sender.send(message.id);
                    async {}
                },
                cancel,
            )
            .await
    });
    (handle, receiver)
}

async fn wait_for_subscribers<P: MessagePersistence>(store: &MessageStore<P>, count: usize) {
    timeout(WAIT, async {
        while store.subscriber_count() != count {
            sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("subscriber count never settled");
}

#[tokio::test]
async fn backlog_then_live_over_grpc() -> anyhow::Result<()> {
    let server = ephemeral_server(memory_store().await).await?;
    let service = RemoteService::connect_lazy(server.endpoint())?;

    let a = service.send_message("A", "one").await?;
    let b = service.send_message("B", "two").await?;
    assert_eq!((a.id, b.id), (1, 2));

    let mut stream = service.subscribe(0).await?;
    let first = timeout(WAIT, stream.next()).await?.unwrap()?;
    let second = timeout(WAIT, stream.next()).await?.unwrap()?;
    assert_eq!((first.sender.as_str(), first.text.as_str()), ("A", "one"));
    assert_eq!(first.created_at, a.created_at);
    assert_eq!(second.id, 2);

    let c = service.send_message("C", "three").await?;
    assert_eq!(c.id, 3);
    let third = timeout(WAIT, stream.next()).await?.unwrap()?;
    assert_eq!(third, c);

    server.stop().await
}

#[tokio::test]
async fn invalid_input_is_rejected_with_invalid_argument() -> anyhow::Result<()> {
    let server = ephemeral_server(memory_store().await).await?;
    let service = RemoteService::connect_lazy(server.endpoint())?;

    for (sender, text) in [("", "hi"), ("A", ""), ("A", "caf\u{e9}")] {
        match service.send_message(sender, text).await {
            Err(ChatError::Transport(status)) => assert_eq!(status.code(), Code::InvalidArgument),
            other => panic!("expected invalid argument, got {other:?}"),
        }
    }
    let too_long = "x".repeat(1025);
    let error = service.send_message("A", &too_long).await.unwrap_err();
    assert!(error.is_invalid_input());

    // exactly at the limit is fine
    assert_eq!(service.send_message("A", &"x".repeat(1024)).await?.id, 1);
    server.stop().await
}

#[tokio::test]
async fn client_disconnect_releases_registration() -> anyhow::Result<()> {
    let store = memory_store().await;
    let server = ephemeral_server(store.clone()).await?;
    let service = RemoteService::connect_lazy(server.endpoint())?;

    let stream = service.subscribe(0).await?;
    wait_for_subscribers(&store, 1).await;
    drop(stream);
    wait_for_subscribers(&store, 0).await;

    server.stop().await
}

#[tokio::test]
async fn shutdown_ends_open_streams() -> anyhow::Result<()> {
    let store = memory_store().await;
    let server = ephemeral_server(store.clone()).await?;
    let service = RemoteService::connect_lazy(server.endpoint())?;

    let mut stream = service.subscribe(0).await?;
    wait_for_subscribers(&store, 1).await;
    server.stop().await?;

    // either a clean end or a transport error, but never a hang
    if let Some(item) = timeout(WAIT, stream.next()).await? {
        assert!(item.is_err());
    }
    assert_eq!(store.subscriber_count(), 0);
    Ok(())
}

#[tokio::test]
async fn reliable_subscriber_survives_server_restart() -> anyhow::Result<()> {
    let pool = test_db_pool().await;
    let store = MessageStore::open(SqliteMessagePersistence::new(pool.clone())).await?;
    let server = ephemeral_server(store).await?;
    let address = server.address;
    let service = RemoteService::connect_lazy(server.endpoint())?;

    let cancel = CancellationToken::new();
    let (handle, mut received) = follow(service.clone(), 0, cancel.clone());

    service.send_message("A", "one").await?;
    service.send_message("B", "two").await?;
    assert_eq!(timeout(WAIT, received.recv()).await?, Some(1));
    assert_eq!(timeout(WAIT, received.recv()).await?, Some(2));

    server.stop().await?;

    // the restarted server recovers its head from sqlite
    let store = MessageStore::open(SqliteMessagePersistence::new(pool)).await?;
    assert_eq!(store.head().await, 2);
    let server = start_server(store.clone(), address).await?;

    let three = timeout(WAIT, async {
        loop {
            match service.send_message("C", "three").await {
                Ok(message) => break message,
                Err(_) => sleep(Duration::from_millis(20)).await,
            }
        }
    })
    .await?;
    assert_eq!(three.id, 3);
    assert_eq!(timeout(WAIT, received.recv()).await?, Some(3));

    cancel.cancel();
    assert_eq!(timeout(WAIT, handle).await??, 3);
    // 1 and 2 were not delivered a second time
    assert!(received.try_recv().is_err());

    server.stop().await
}
