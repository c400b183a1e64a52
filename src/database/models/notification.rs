use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::datetime::now_rfc3339;

/// Broadcast category, stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    ProgramChange,
    NewEvent,
    Reminder,
    General,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NotificationKind::ProgramChange => "program_change",
            NotificationKind::NewEvent => "new_event",
            NotificationKind::Reminder => "reminder",
            NotificationKind::General => "general",
        }
    }
}

/// One broadcast unit. Created before any delivery is attempted, so a crash
/// mid-fan-out still leaves an auditable record with `is_sent = false`.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub event_id: i64,
    pub speech_id: Option<i64>,
    pub title: String,
    pub message: String,
    pub notification_type: String,
    pub is_sent: bool,
    pub created_at: String,
}

/// Per-recipient delivery receipt; only written for sends the delivery
/// channel accepted.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserNotification {
    pub id: String,
    pub participant_id: i64,
    pub notification_id: String,
    pub is_read: bool,
    pub sent_at: String,
}

impl Notification {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        event_id: i64,
        speech_id: Option<i64>,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            "INSERT INTO notifications (id, event_id, speech_id, title, message, notification_type, is_sent, created_at)
             VALUES (?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(event_id)
        .bind(speech_id)
        .bind(title)
        .bind(message)
        .bind(kind.as_str())
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(Notification {
            id,
            event_id,
            speech_id,
            title: title.to_string(),
            message: message.to_string(),
            notification_type: kind.as_str().to_string(),
            is_sent: false,
            created_at: now,
        })
    }

    pub async fn mark_sent(
        pool: &sqlx::SqlitePool,
        notification_id: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE notifications SET is_sent = 1 WHERE id = ?")
            .bind(notification_id)
            .execute(pool)
            .await?;
        Ok(())
    }

    pub async fn find_by_event(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT id, event_id, speech_id, title, message, notification_type, is_sent, created_at
             FROM notifications WHERE event_id = ? ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    pub async fn reminder_exists_for_speech(
        pool: &sqlx::SqlitePool,
        speech_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications WHERE notification_type = 'reminder' AND speech_id = ?",
        )
        .bind(speech_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }

    pub async fn event_reminder_exists(
        pool: &sqlx::SqlitePool,
        event_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM notifications
             WHERE notification_type = 'reminder' AND event_id = ? AND speech_id IS NULL",
        )
        .bind(event_id)
        .fetch_one(pool)
        .await?;

        Ok(count > 0)
    }
}

impl UserNotification {
    pub async fn create(
        pool: &sqlx::SqlitePool,
        participant_id: i64,
        notification_id: &str,
    ) -> Result<Self, sqlx::Error> {
        let id = Uuid::new_v4().to_string();
        let now = now_rfc3339();

        sqlx::query(
            "INSERT INTO user_notifications (id, participant_id, notification_id, is_read, sent_at)
             VALUES (?, ?, ?, 0, ?)",
        )
        .bind(&id)
        .bind(participant_id)
        .bind(notification_id)
        .bind(&now)
        .execute(pool)
        .await?;

        Ok(UserNotification {
            id,
            participant_id,
            notification_id: notification_id.to_string(),
            is_read: false,
            sent_at: now,
        })
    }

    pub async fn count_for_notification(
        pool: &sqlx::SqlitePool,
        notification_id: &str,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM user_notifications WHERE notification_id = ?",
        )
        .bind(notification_id)
        .fetch_one(pool)
        .await
    }
}
