use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::database::models::Participant;
use crate::utils::datetime::now_rfc3339;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Subscription {
    pub id: i64,
    pub participant_id: i64,
    pub event_id: i64,
    pub notify_program_changes: bool,
    pub notify_new_events: bool,
    pub notify_reminders: bool,
    pub subscribed_at: String,
}

/// The three independent per-event notification toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationToggle {
    ProgramChanges,
    NewEvents,
    Reminders,
}

impl NotificationToggle {
    fn column(self) -> &'static str {
        match self {
            NotificationToggle::ProgramChanges => "notify_program_changes",
            NotificationToggle::NewEvents => "notify_new_events",
            NotificationToggle::Reminders => "notify_reminders",
        }
    }
}

impl Subscription {
    /// One row per (participant, event); all toggles default to on.
    pub async fn get_or_create(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
        event_id: i64,
    ) -> Result<Self, sqlx::Error> {
        let now = now_rfc3339();

        sqlx::query(
            "INSERT OR IGNORE INTO subscriptions (participant_id, event_id, subscribed_at)
             VALUES (?, ?, ?)",
        )
        .bind(participant_id)
        .bind(event_id)
        .bind(&now)
        .execute(pool)
        .await?;

        Self::find_by_participant_event(pool, participant_id, event_id)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    pub async fn find_by_id(
        pool: &sqlx::SqlitePool,
        subscription_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, participant_id, event_id, notify_program_changes, notify_new_events,
                    notify_reminders, subscribed_at
             FROM subscriptions WHERE id = ?",
        )
        .bind(subscription_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_participant_event(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
        event_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Subscription>(
            "SELECT id, participant_id, event_id, notify_program_changes, notify_new_events,
                    notify_reminders, subscribed_at
             FROM subscriptions WHERE participant_id = ? AND event_id = ?",
        )
        .bind(participant_id)
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// Flips one toggle and returns the updated row; `None` when the
    /// subscription does not exist.
    pub async fn toggle(
        pool: &sqlx::SqlitePool,
        subscription_id: i64,
        toggle: NotificationToggle,
    ) -> Result<Option<Self>, sqlx::Error> {
        let column = toggle.column();
        let sql = format!("UPDATE subscriptions SET {column} = NOT {column} WHERE id = ?");

        let result = sqlx::query(&sql).bind(subscription_id).execute(pool).await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        Self::find_by_id(pool, subscription_id).await
    }

    pub async fn has_any(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subscriptions WHERE participant_id = ?",
        )
        .bind(participant_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn has_new_events_enabled(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM subscriptions WHERE participant_id = ? AND notify_new_events = 1",
        )
        .bind(participant_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn subscribers_for_program_changes(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT p.id, p.telegram_id, p.username, p.full_name, p.company, p.position,
                    p.experience, p.looking_for, p.registered_at
             FROM subscriptions s
             JOIN participants p ON p.id = s.participant_id
             WHERE s.event_id = ? AND s.notify_program_changes = 1
             ORDER BY p.registered_at",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn subscribers_for_reminders(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        sqlx::query_as::<_, Participant>(
            "SELECT p.id, p.telegram_id, p.username, p.full_name, p.company, p.position,
                    p.experience, p.looking_for, p.registered_at
             FROM subscriptions s
             JOIN participants p ON p.id = s.participant_id
             WHERE s.event_id = ? AND s.notify_reminders = 1
             ORDER BY p.registered_at",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn delete_for_participant(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE participant_id = ?")
            .bind(participant_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
