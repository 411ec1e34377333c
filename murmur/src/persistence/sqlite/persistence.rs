use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use super::error::SqlError;
use crate::{
    constants::RETENTION_LIMIT,
    message::now_millis,
    persistence::{MessagePersistence, RetainedRange},
    Message,
};

/// A persistence type backed by sqlite. Run [migrate](super::migrate)
/// on the pool first.
pub struct SqliteMessagePersistence {
    /// Connection pool
    pool: SqlitePool,
    /// Number of rows kept after every insert.
    retention: usize,
}

impl SqliteMessagePersistence {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_retention(pool, RETENTION_LIMIT)
    }

    /// Keep at most `retention` rows (at least one).
    pub fn with_retention(pool: SqlitePool, retention: usize) -> Self {
        Self {
            pool,
            retention: retention.max(1),
        }
    }

    fn from_row(row: &SqliteRow) -> Message {
        Message {
            id: row.get::<i64, _>("id"),
            sender: row.get::<String, _>("sender"),
            text: row.get::<String, _>("text"),
            created_at: row.get::<i64, _>("created_at"),
        }
    }
}

#[async_trait::async_trait]
impl MessagePersistence for SqliteMessagePersistence {
    type Error = SqlError;

    async fn insert(&self, sender: &str, text: &str) -> Result<Message, Self::Error> {
        let created_at = now_millis();
        // insert + purge inside the same transaction
        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            r#"
                INSERT INTO messages (sender, text, created_at)
                VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(sender)
        .bind(text)
        .bind(created_at)
        .execute(&mut tx)
        .await?
        .last_insert_rowid();
        sqlx::query(
            r#"
                DELETE FROM messages
                WHERE id NOT IN (
                    SELECT id
                    FROM messages
                    ORDER BY id DESC
                    LIMIT ?1
                )
            "#,
        )
        .bind(self.retention as i64)
        .execute(&mut tx)
        .await?;
        tx.commit().await?;
        Ok(Message {
            id,
            sender: sender.to_string(),
            text: text.to_string(),
            created_at,
        })
    }

    async fn read_since(&self, since_id: i64, limit: usize) -> Result<Vec<Message>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let rows = sqlx::query(
            r#"
                SELECT id, sender, text, created_at
                FROM messages
                WHERE id > ?1
                ORDER BY id ASC
                LIMIT ?2
            "#,
        )
        .bind(since_id)
        .bind(limit as i64)
        .fetch_all(&mut conn)
        .await?;
        Ok(rows.iter().map(Self::from_row).collect())
    }

    async fn retained_range(&self) -> Result<Option<RetainedRange>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query(
            r#"
                SELECT MIN(id) AS oldest, MAX(id) AS newest
                FROM messages
            "#,
        )
        .fetch_one(&mut conn)
        .await?;
        let oldest = row.get::<Option<i64>, _>("oldest");
        let newest = row.get::<Option<i64>, _>("newest");
        Ok(oldest
            .zip(newest)
            .map(|(oldest, newest)| RetainedRange { oldest, newest }))
    }

    fn retention(&self) -> usize {
        self.retention
    }
}
