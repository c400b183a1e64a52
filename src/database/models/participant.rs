use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::now_rfc3339;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Participant {
    pub id: i64,
    pub telegram_id: i64,
    pub username: String,
    pub full_name: String,
    pub company: String,
    pub position: String,
    pub experience: String,
    pub looking_for: String,
    pub registered_at: String,
}

impl Participant {
    /// Idempotent registration: the first flow that needs to persist anything
    /// on behalf of a user creates the row, every later call returns it.
    pub async fn get_or_create(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
        username: Option<&str>,
        full_name: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = now_rfc3339();

        sqlx::query(
            "INSERT OR IGNORE INTO participants (telegram_id, username, full_name, registered_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(telegram_id)
        .bind(username.unwrap_or_default())
        .bind(full_name)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_telegram_id(pool, telegram_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_telegram_id(
        pool: &sqlx::SqlitePool,
        telegram_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, telegram_id, username, full_name, company, position, experience,
                    looking_for, registered_at
             FROM participants WHERE telegram_id = ?",
        )
        .bind(telegram_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn all(pool: &sqlx::SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT id, telegram_id, username, full_name, company, position, experience,
                    looking_for, registered_at
             FROM participants ORDER BY registered_at",
        )
        .fetch_all(pool)
        .await
    }

    /// Refreshes username/full_name when Telegram reports different values
    /// than what was stored at registration time.
    pub async fn refresh_identity(
        &mut self,
        pool: &sqlx::SqlitePool,
        username: Option<&str>,
        full_name: &str,
    ) -> Result<(), sqlx::Error> {
        let username = username.unwrap_or_default();
        if self.username == username && self.full_name == full_name {
            return Ok(());
        }

        sqlx::query("UPDATE participants SET username = ?, full_name = ? WHERE id = ?")
            .bind(username)
            .bind(full_name)
            .bind(self.id)
            .execute(pool)
            .await?;

        self.username = username.to_string();
        self.full_name = full_name.to_string();
        Ok(())
    }
}
