use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::now_rfc3339;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub date: String,
    pub is_active: bool,
    pub created_at: String,
}

impl Event {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        title: &str,
        description: &str,
        date: &str,
        is_active: bool,
    ) -> Result<Self, sqlx::Error> {
        let now = now_rfc3339();

        let result = sqlx::query(
            "INSERT INTO events (title, description, date, is_active, created_at) VALUES (?, ?, ?, ?, ?)"
        )
        .bind(title)
        .bind(description)
        .bind(date)
        .bind(is_active)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, description, date, is_active, created_at FROM events WHERE id = ?",
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// The event the bot talks about: the nearest active one.
    pub async fn find_active(pool: &sqlx::SqlitePool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, description, date, is_active, created_at
             FROM events WHERE is_active = 1 ORDER BY date LIMIT 1",
        )
        .fetch_optional(pool)
        .await
    }

    pub async fn find_all_active(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Event>(
            "SELECT id, title, description, date, is_active, created_at
             FROM events WHERE is_active = 1 ORDER BY date",
        )
        .fetch_all(pool)
        .await
    }
}
