use anyhow::Result;
use tracing::error;

use crate::database::models::{Event, Speech};
use crate::services::outbox::Outbox;
use crate::utils::datetime::{format_time, now_rfc3339, parse_rfc3339};

const NO_ACTIVE_EVENT: &str = "В данный момент нет активных событий";
const NO_PROGRAM: &str = "Программа выступлений пока не доступна";
const LOAD_FAILED: &str = "Произошла ошибка при загрузке программы";

/// Renders the schedule of the active event, marking each speech as current,
/// upcoming or finished relative to now.
pub async fn send_schedule(
    outbox: &dyn Outbox,
    pool: &sqlx::SqlitePool,
    chat_id: i64,
) -> Result<()> {
    match render_schedule(pool).await {
        Ok(text) => outbox.send_text(chat_id, &text).await,
        Err(e) => {
            error!("Failed to render schedule: {}", e);
            outbox.send_text(chat_id, LOAD_FAILED).await
        }
    }
}

async fn render_schedule(pool: &sqlx::SqlitePool) -> Result<String> {
    let Some(event) = Event::find_active(pool).await? else {
        return Ok(NO_ACTIVE_EVENT.to_string());
    };

    let entries = Speech::program_for_event(pool, event.id).await?;
    if entries.is_empty() {
        return Ok(NO_PROGRAM.to_string());
    }

    let now = now_rfc3339();
    let mut text = format!("Программа: {}\n\n", event.title);

    for entry in entries {
        let status = if entry.start_time <= now && now <= entry.end_time {
            "Сейчас"
        } else if now < entry.start_time {
            "Будет"
        } else {
            "Завершено"
        };

        let start = parse_rfc3339(&entry.start_time)
            .map(|dt| format_time(&dt))
            .unwrap_or_else(|_| entry.start_time.clone());
        let end = parse_rfc3339(&entry.end_time)
            .map(|dt| format_time(&dt))
            .unwrap_or_else(|_| entry.end_time.clone());

        text.push_str(&format!("{}, {}-{}\n", status, start, end));
        text.push_str(&format!("спикер - {}\n", entry.speaker_name));
        text.push_str(&format!("тема: {}\n\n", entry.title));
    }

    Ok(text)
}
