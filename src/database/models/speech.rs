use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Speech {
    pub id: i64,
    pub event_id: i64,
    pub speaker_id: i64,
    pub title: String,
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    pub is_active: bool,
}

/// One schedule row: a speech joined with its speaker's name.
#[derive(Debug, Clone, FromRow)]
pub struct ProgramEntry {
    pub title: String,
    pub start_time: String,
    pub end_time: String,
    pub speaker_name: String,
}

impl Speech {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        speaker_id: i64,
        title: &str,
        description: &str,
        start_time: &str,
        end_time: &str,
        is_active: bool,
    ) -> Result<Self, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO speeches (event_id, speaker_id, title, description, start_time, end_time, is_active)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event_id)
        .bind(speaker_id)
        .bind(title)
        .bind(description)
        .bind(start_time)
        .bind(end_time)
        .bind(is_active)
        .execute(pool)
        .await?;

        Self::find_by_id(pool, result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speech>(
            "SELECT id, event_id, speaker_id, title, description, start_time, end_time, is_active
             FROM speeches WHERE id = ?",
        )
        .bind(speech_id)
        .fetch_optional(pool)
        .await
    }

    /// The speech whose time window contains `now`. The data model does not
    /// enforce exclusivity, so ties are broken by the earliest start.
    pub async fn find_active_at(
        pool: &sqlx::SqlitePool,
        now: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speech>(
            "SELECT id, event_id, speaker_id, title, description, start_time, end_time, is_active
             FROM speeches WHERE start_time <= ? AND end_time >= ?
             ORDER BY start_time LIMIT 1",
        )
        .bind(now)
        .bind(now)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_speaker(
        pool: &sqlx::SqlitePool,
        speaker_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speech>(
            "SELECT id, event_id, speaker_id, title, description, start_time, end_time, is_active
             FROM speeches WHERE speaker_id = ? ORDER BY start_time",
        )
        .bind(speaker_id)
        .fetch_all(pool)
        .await
    }

    /// Speeches of one event starting inside `(from, until]`, for the
    /// reminder sweep.
    pub async fn find_starting_within(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        from: &str,
        until: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Speech>(
            "SELECT id, event_id, speaker_id, title, description, start_time, end_time, is_active
             FROM speeches WHERE event_id = ? AND start_time > ? AND start_time <= ?
             ORDER BY start_time",
        )
        .bind(event_id)
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    /// Schedule of one event in program order, with speaker names resolved in
    /// a single query.
    pub async fn program_for_event(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<ProgramEntry>, sqlx::Error> {
        sqlx::query_as::<_, ProgramEntry>(
            "SELECT s.title, s.start_time, s.end_time, sp.name AS speaker_name
             FROM speeches s
             JOIN speakers sp ON sp.id = s.speaker_id
             WHERE s.event_id = ?
             ORDER BY s.start_time",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes a speech and returns the deleted row, if it existed.
    pub async fn delete(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let Some(speech) = Self::find_by_id(pool, speech_id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM speeches WHERE id = ?")
            .bind(speech_id)
            .execute(pool)
            .await?;

        Ok(Some(speech))
    }
}
