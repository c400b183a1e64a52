use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use tempfile::{tempdir, TempDir};
use tokio::sync::Mutex;

use meetup_companion_bot::database::connection::DatabaseManager;
use meetup_companion_bot::database::models::{Event, Speaker, Speech};
use meetup_companion_bot::services::outbox::Outbox;
use meetup_companion_bot::utils::datetime::to_rfc3339;

pub async fn setup_test_db() -> Result<(DatabaseManager, TempDir)> {
    let temp_dir = tempdir()?;
    let db_path = temp_dir.path().join("test.db");
    let database_url = format!("sqlite:{}", db_path.display());

    let db = DatabaseManager::new(&database_url).await?;
    db.run_migrations().await?;

    Ok((db, temp_dir))
}

/// Outbox fake that records every send and never fails.
#[derive(Default)]
pub struct RecordingOutbox {
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl RecordingOutbox {
    pub async fn messages_for(&self, chat_id: i64) -> Vec<String> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(id, _)| *id == chat_id)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub async fn last_message_for(&self, chat_id: i64) -> Option<String> {
        self.messages_for(chat_id).await.pop()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Outbox for RecordingOutbox {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<()> {
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }
}

/// Outbox fake that rejects sends to one chat and records the rest.
pub struct FailingOutbox {
    pub fail_chat: i64,
    pub sent: Mutex<Vec<(i64, String)>>,
}

impl FailingOutbox {
    pub fn new(fail_chat: i64) -> Self {
        Self {
            fail_chat,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl Outbox for FailingOutbox {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        if chat_id == self.fail_chat {
            return Err(anyhow!("chat {} unreachable", chat_id));
        }
        self.sent.lock().await.push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_markdown(&self, chat_id: i64, text: &str) -> Result<()> {
        self.send_text(chat_id, text).await
    }
}

pub async fn seed_event(db: &DatabaseManager, title: &str, starts_in_minutes: i64) -> Event {
    let date = to_rfc3339(&(Utc::now() + Duration::minutes(starts_in_minutes)));
    Event::create(&db.pool, title, "Описание", &date, true)
        .await
        .expect("Failed to create event")
}

pub async fn seed_speaker(db: &DatabaseManager, name: &str, telegram_id: Option<i64>) -> Speaker {
    Speaker::create(&db.pool, name, telegram_id)
        .await
        .expect("Failed to create speaker")
}

/// A speech whose window is `[now + start_offset, now + end_offset]` minutes.
pub async fn seed_speech(
    db: &DatabaseManager,
    event: &Event,
    speaker: &Speaker,
    title: &str,
    start_offset_minutes: i64,
    end_offset_minutes: i64,
) -> Speech {
    let now = Utc::now();
    let start = to_rfc3339(&(now + Duration::minutes(start_offset_minutes)));
    let end = to_rfc3339(&(now + Duration::minutes(end_offset_minutes)));
    Speech::create(
        &db.pool,
        event.id,
        speaker.id,
        title,
        "Описание доклада",
        &start,
        &end,
        true,
    )
    .await
    .expect("Failed to create speech")
}
