use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::datetime::now_rfc3339;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub speech_id: i64,
    pub participant_id: i64,
    pub question_text: String,
    pub created_at: String,
    pub is_answered: bool,
}

impl Question {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
        participant_id: i64,
        question_text: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = now_rfc3339();

        let result = sqlx::query(
            "INSERT INTO questions (speech_id, participant_id, question_text, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(speech_id)
        .bind(participant_id)
        .bind(question_text)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        question_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            "SELECT id, speech_id, participant_id, question_text, created_at, is_answered
             FROM questions WHERE id = ?",
        )
        .bind(question_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_speech(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Question>(
            "SELECT id, speech_id, participant_id, question_text, created_at, is_answered
             FROM questions WHERE speech_id = ? ORDER BY created_at",
        )
        .bind(speech_id)
        .fetch_all(pool)
        .await
    }
}
