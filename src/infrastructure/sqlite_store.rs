use async_trait::async_trait;
use sqlx::{SqlitePool, sqlite::SqlitePoolOptions};

use crate::application::{AppError, AppResult, IntervalStore};
use crate::domain::{ChannelId, IntervalMs, IntervalOverride};

pub struct SqliteIntervalStore {
    pool: SqlitePool,
}

impl SqliteIntervalStore {
    /// db_url examples
    /// - "sqlite:/data/ratecontrol.db?mode=rwc"
    /// - "sqlite::memory:" (tests)
    pub async fn new(db_url: &str) -> AppResult<Self> {
        // every connection to :memory: opens its own database
        let max_connections = if db_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> AppResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS channel_interval (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              channel_id TEXT NOT NULL UNIQUE,
              interval_ms INTEGER NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(())
    }

    pub async fn count(&self) -> AppResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM channel_interval")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        Ok(row.0)
    }
}

#[async_trait]
impl IntervalStore for SqliteIntervalStore {
    async fn get(&self, channel: &ChannelId) -> AppResult<Option<IntervalMs>> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT interval_ms FROM channel_interval WHERE channel_id = ? LIMIT 1")
                .bind(channel.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::Storage(e.to_string()))?;

        row.map(|(v,)| IntervalMs::try_from_i64(v))
            .transpose()
            .map_err(|e| AppError::Storage(format!("corrupt row for {channel}: {e}")))
    }

    async fn set(&self, channel: &ChannelId, interval: IntervalMs) -> AppResult<IntervalOverride> {
        let stored = i64::try_from(interval.as_millis())
            .map_err(|_| AppError::Storage(format!("interval {interval} does not fit in sqlite")))?;

        let (id, value): (i64, i64) = sqlx::query_as(
            r#"
            INSERT INTO channel_interval(channel_id, interval_ms) VALUES(?, ?)
            ON CONFLICT(channel_id) DO UPDATE SET interval_ms=excluded.interval_ms
            RETURNING id, interval_ms
            "#,
        )
        .bind(channel.as_str())
        .bind(stored)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::Storage(e.to_string()))?;

        Ok(IntervalOverride {
            id,
            channel_id: channel.clone(),
            interval_ms: IntervalMs::try_from_i64(value)?,
        })
    }
}
