use anyhow::Result;
use tracing::error;

use crate::database::models::{Question, Speaker, Speech};
use crate::services::outbox::Outbox;

const SPEAKERS_ONLY: &str = "Эта команда доступна только спикерам.";
const NO_SPEECHES: &str = "За тобой пока не закреплено ни одного выступления.";
const LOAD_FAILED: &str = "Произошла ошибка при загрузке вопросов. Попробуйте позже";

/// Lists the questions asked for each of the speaker's speeches.
pub async fn send_speaker_questions(
    outbox: &dyn Outbox,
    pool: &sqlx::SqlitePool,
    telegram_id: i64,
) -> Result<()> {
    match render_speaker_questions(pool, telegram_id).await {
        Ok(text) => outbox.send_text(telegram_id, &text).await,
        Err(e) => {
            error!("Failed to load questions for {}: {}", telegram_id, e);
            outbox.send_text(telegram_id, LOAD_FAILED).await
        }
    }
}

async fn render_speaker_questions(pool: &sqlx::SqlitePool, telegram_id: i64) -> Result<String> {
    let Some(speaker) = Speaker::find_by_telegram_id(pool, telegram_id).await? else {
        return Ok(SPEAKERS_ONLY.to_string());
    };

    let speeches = Speech::find_by_speaker(pool, speaker.id).await?;
    if speeches.is_empty() {
        return Ok(NO_SPEECHES.to_string());
    }

    let mut text = String::from("Вопросы к твоим выступлениям:\n");
    let mut total = 0;

    for speech in speeches {
        let questions = Question::find_by_speech(pool, speech.id).await?;
        text.push_str(&format!("\n«{}»\n", speech.title));

        if questions.is_empty() {
            text.push_str("Вопросов пока нет\n");
            continue;
        }

        for question in questions {
            let marker = if question.is_answered { "[✓]" } else { "[ ]" };
            text.push_str(&format!("{} {}\n", marker, question.question_text));
            total += 1;
        }
    }

    if total == 0 {
        text.push_str("\nПока никто не задал ни одного вопроса.");
    }

    Ok(text)
}
