use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Speaker {
    pub id: i64,
    pub name: String,
    pub telegram_id: Option<i64>,
}

impl Speaker {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        name: &str,
        telegram_id: Option<i64>,
    ) -> Result<Self, sqlx::Error> {
        let result = sqlx::query("INSERT INTO speakers (name, telegram_id) VALUES (?, ?)")
            .bind(name)
            .bind(telegram_id)
            .execute(pool)
            .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        speaker_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speaker>("SELECT id, name, telegram_id FROM speakers WHERE id = ?")
            .bind(speaker_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speaker>(
            "SELECT id, name, telegram_id FROM speakers WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }
}
