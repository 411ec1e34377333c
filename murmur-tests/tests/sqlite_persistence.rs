use std::collections::BTreeSet;

use futures_util::stream::StreamExt;
use murmur::{
    sqlite::{migrate, SqliteMessagePersistence},
    MessagePersistence, MessageStore, RetainedRange, StoreConfig, StreamingSession,
};
use rand::Rng;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tokio_util::sync::CancellationToken;

async fn test_db_pool() -> SqlitePool {
    // a single connection, or every connection gets its own in-memory db
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrate(&pool).await.unwrap();
    pool
}

fn ids(messages: &[murmur::Message]) -> Vec<i64> {
    messages.iter().map(|m| m.id).collect()
}

#[tokio::test]
async fn initialize_empty() {
    let persistence = SqliteMessagePersistence::new(test_db_pool().await);
    assert_eq!(persistence.retained_range().await.unwrap(), None);
    assert!(persistence.read_since(0, 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn insert_assigns_ids_and_timestamps() -> anyhow::Result<()> {
    let persistence = SqliteMessagePersistence::new(test_db_pool().await);
    let one = persistence.insert("A", "one").await?;
    let two = persistence.insert("B", "two\twith tab\nand newline").await?;
    assert_eq!((one.id, two.id), (1, 2));
    assert!(one.created_at > 0 && one.created_at <= two.created_at);

    let read = persistence.read_since(0, 10).await?;
    assert_eq!(read, vec![one, two.clone()]);
    assert_eq!(persistence.read_since(1, 10).await?, vec![two]);
    assert_eq!(
        persistence.retained_range().await?,
        Some(RetainedRange {
            oldest: 1,
            newest: 2
        })
    );
    Ok(())
}

#[tokio::test]
async fn retention_evicts_oldest() -> anyhow::Result<()> {
    let persistence = SqliteMessagePersistence::with_retention(test_db_pool().await, 5);
    for i in 0..12 {
        persistence.insert("A", &format!("m{i}")).await?;
    }
    assert_eq!(ids(&persistence.read_since(0, 100).await?), vec![8, 9, 10, 11, 12]);
    assert_eq!(ids(&persistence.read_since(0, 2).await?), vec![8, 9]);
    assert_eq!(
        persistence.retained_range().await?,
        Some(RetainedRange {
            oldest: 8,
            newest: 12
        })
    );
    Ok(())
}

#[tokio::test]
async fn ids_are_never_reused() -> anyhow::Result<()> {
    let pool = test_db_pool().await;
    let persistence = SqliteMessagePersistence::new(pool.clone());
    for i in 0..3 {
        persistence.insert("A", &format!("m{i}")).await?;
    }
    sqlx::query("DELETE FROM messages").execute(&pool).await?;
    assert_eq!(persistence.retained_range().await?, None);
    assert_eq!(persistence.insert("A", "again").await?.id, 4);
    Ok(())
}

#[tokio::test]
async fn reopened_store_continues_from_head() -> anyhow::Result<()> {
    let pool = test_db_pool().await;
    let store = MessageStore::open(SqliteMessagePersistence::new(pool.clone())).await?;
    for i in 0..3 {
        store.append("A", format!("m{i}")).await?;
    }
    drop(store);

    let store = MessageStore::open(SqliteMessagePersistence::new(pool)).await?;
    assert_eq!(store.head().await, 3);
    assert_eq!(store.append("A", "after restart").await?.id, 4);
    assert_eq!(ids(&store.snapshot_backlog(2).await?), vec![3, 4]);
    Ok(())
}

#[tokio::test]
async fn cursor_behind_retention_resumes_at_oldest() -> anyhow::Result<()> {
    let pool = test_db_pool().await;
    let store = MessageStore::open(SqliteMessagePersistence::with_retention(pool, 3)).await?;
    for i in 0..10 {
        store.append("A", format!("m{i}")).await?;
    }
    let range = store.retained_range().await?.unwrap();
    assert_eq!(range, RetainedRange { oldest: 8, newest: 10 });
    assert!(range.has_gap_after(2));
    assert!(!range.has_gap_after(7));

    let mut stream = StreamingSession::new(store.clone(), 2, CancellationToken::new()).into_stream();
    for expected in 8..=10 {
        assert_eq!(stream.next().await.unwrap()?.id, expected);
    }
    Ok(())
}

#[tokio::test]
async fn session_pages_backlog_then_goes_live() -> anyhow::Result<()> {
    let pool = test_db_pool().await;
    let config = StoreConfig {
        retention: 100,
        batch_size: 4,
    };
    let persistence = SqliteMessagePersistence::with_retention(pool, config.retention);
    let store = MessageStore::open_with(persistence, &config).await?;
    for i in 0..10 {
        store.append("A", format!("m{i}")).await?;
    }

    let mut stream = StreamingSession::new(store.clone(), 0, CancellationToken::new()).into_stream();
    let mut received = Vec::new();
    for _ in 0..10 {
        received.push(stream.next().await.unwrap()?.id);
    }
    assert_eq!(received, (1..=10).collect::<Vec<_>>());

    store.append("B", "live").await?;
    let live = stream.next().await.unwrap()?;
    assert_eq!((live.id, live.sender.as_str()), (11, "B"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_appends_are_gapless() -> anyhow::Result<()> {
    let store = MessageStore::open(SqliteMessagePersistence::new(test_db_pool().await)).await?;
    let mut subscription = store.subscribe(0).await?.subscription;

    let producers = (0..6)
        .map(|p| {
            let store = store.clone();
            tokio::spawn(async move {
                for i in 0..20 {
                    let pause = rand::thread_rng().gen_range(0..3);
                    for _ in 0..pause {
                        tokio::task::yield_now().await;
                    }
                    store.append(format!("p{p}"), format!("m{i}")).await.unwrap();
                }
            })
        })
        .collect::<Vec<_>>();
    for producer in producers {
        producer.await?;
    }

    let stored: BTreeSet<i64> = ids(&store.snapshot_backlog(0).await?).into_iter().collect();
    assert_eq!(stored, (1..=120).collect::<BTreeSet<_>>());

    // live delivery follows commit order
    let mut last = 0;
    for _ in 0..120 {
        let message = subscription.recv().await.unwrap();
        assert_eq!(message.id, last + 1);
        last = message.id;
    }
    Ok(())
}
