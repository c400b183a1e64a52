use anyhow::Result;
use tracing::{error, info};

use crate::database::models::{Participant, Question, Speaker, Speech};
use crate::flows::session::{FlowState, Session};
use crate::flows::{FlowEngine, UserIdentity};
use crate::utils::datetime::now_rfc3339;

const NO_ACTIVE_SPEECH: &str = "В данный момент нет активных выступлений.\n\
    Вопросы можно задавать только во время выступления спикера.";

const SPEECH_GONE: &str = "Ошибка: выступление не найдено";

const THANKS: &str = "Спасибо! Я передал твой вопрос спикеру.\n\
    Можешь задать ещё один или вернуться к программе/нетворкингу через меню.";

const SAVE_FAILED: &str = "Произошла ошибка при сохранении вопроса. Попробуйте позже";

/// Enters the question flow if a speech is live right now; otherwise explains
/// why not and leaves the session untouched.
pub(crate) async fn start(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
) -> Result<()> {
    let now = now_rfc3339();
    let Some(speech) = Speech::find_active_at(engine.pool(), &now).await? else {
        engine
            .outbox()
            .send_text(user.telegram_id, NO_ACTIVE_SPEECH)
            .await?;
        return Ok(());
    };

    let speaker_name = Speaker::find_by_id(engine.pool(), speech.speaker_id)
        .await?
        .map(|s| s.name)
        .unwrap_or_else(|| "текущего спикера".to_string());

    session.state = FlowState::AwaitingQuestion {
        speech_id: speech.id,
    };

    let prompt = format!(
        "Окей! Напиши, пожалуйста, свой вопрос для текущего спикера: {}.\nТема: {}",
        speaker_name, speech.title
    );
    engine.outbox().send_text(user.telegram_id, &prompt).await?;
    Ok(())
}

/// Claims the message when a question is awaited. The raw text becomes the
/// question body; the waiting state is cleared on every terminal outcome,
/// success or failure, so a session can never get stuck here.
pub(crate) async fn handle_if_waiting(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
    text: &str,
) -> Result<bool> {
    let speech_id = match std::mem::take(&mut session.state) {
        FlowState::AwaitingQuestion { speech_id } => speech_id,
        other => {
            session.state = other;
            return Ok(false);
        }
    };

    match submit_question(engine, user, speech_id, text).await {
        Ok(true) => {
            engine.outbox().send_text(user.telegram_id, THANKS).await?;
        }
        Ok(false) => {
            // The speech was deleted between flow entry and the answer.
            engine
                .outbox()
                .send_text(user.telegram_id, SPEECH_GONE)
                .await?;
        }
        Err(e) => {
            error!("Failed to save question from {}: {}", user.telegram_id, e);
            engine
                .outbox()
                .send_text(user.telegram_id, SAVE_FAILED)
                .await?;
        }
    }

    Ok(true)
}

async fn submit_question(
    engine: &FlowEngine,
    user: &UserIdentity,
    speech_id: i64,
    text: &str,
) -> Result<bool> {
    let pool = engine.pool();

    let Some(speech) = Speech::find_by_id(pool, speech_id).await? else {
        return Ok(false);
    };

    let participant = Participant::get_or_create(
        pool,
        user.telegram_id,
        user.username.as_deref(),
        &user.full_name(),
    )
    .await?;

    Question::create(pool, speech.id, participant.id, text).await?;

    info!(
        "Question from {} (@{}) for speech '{}': {}",
        user.telegram_id,
        user.username.as_deref().unwrap_or("-"),
        speech.title,
        text
    );
    Ok(true)
}
