// File: amabot-core/src/repositories/sqlite/messages.rs
//
// Durable window store. One row per message in the `messages` table; every
// statement is scoped by channel_id so concurrent handlers for different
// channels never touch each other's rows. Ties on created_at are broken by
// the autoincrement `seq`, i.e. insertion order.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};
use sqlx::sqlite::SqliteRow;

use amabot_common::models::StoredMessage;
use amabot_common::traits::WindowStore;

use crate::utils::time::{from_epoch_micros, to_epoch_micros};
use crate::Error;

#[derive(Clone)]
pub struct SqliteWindowStore {
    pool: Pool<Sqlite>,
}

impl SqliteWindowStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Number of stored messages for a channel.
    pub async fn count(&self, channel: &str) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE channel_id = ?")
            .bind(channel)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    fn row_to_message(r: &SqliteRow) -> Result<StoredMessage, Error> {
        Ok(StoredMessage {
            id: r.try_get("message_id")?,
            channel_id: r.try_get("channel_id")?,
            author_id: r.try_get("author_id")?,
            content: r.try_get("content")?,
            created_at: from_epoch_micros(r.try_get::<i64, _>("created_at")?),
        })
    }
}

fn as_limit(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

#[async_trait]
impl WindowStore for SqliteWindowStore {
    fn owns_history(&self) -> bool {
        true
    }

    async fn append(&self, message: &StoredMessage) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT OR IGNORE INTO messages (message_id, channel_id, author_id, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#
        )
            .bind(&message.id)
            .bind(&message.channel_id)
            .bind(&message.author_id)
            .bind(&message.content)
            .bind(to_epoch_micros(message.created_at))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn last_n(
        &self,
        channel: &str,
        before: &str,
        n: usize,
    ) -> Result<Vec<StoredMessage>, Error> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query(
            r#"
            SELECT message_id, channel_id, author_id, content, created_at
            FROM messages
            WHERE channel_id = ?
              AND message_id <> ?
            ORDER BY created_at DESC, seq DESC
            LIMIT ?
            "#
        )
            .bind(channel)
            .bind(before)
            .bind(as_limit(n))
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(rows.len());
        for r in rows.iter().rev() {
            out.push(Self::row_to_message(r)?);
        }
        Ok(out)
    }

    async fn prune(&self, channel: &str, keep: usize) -> Result<u64, Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM messages
            WHERE channel_id = ?
              AND seq NOT IN (
                  SELECT seq FROM messages
                  WHERE channel_id = ?
                  ORDER BY created_at DESC, seq DESC
                  LIMIT ?
              )
            "#
        )
            .bind(channel)
            .bind(channel)
            .bind(as_limit(keep))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn forget(&self, channel: &str) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM messages WHERE channel_id = ?")
            .bind(channel)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
