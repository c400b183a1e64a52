use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::commands::{program, questions};
use crate::bot::handlers::HandlerResult;
use crate::bot::keyboards::buttons;
use crate::database::connection::DatabaseManager;
use crate::flows::{FlowEngine, UserIdentity};
use crate::services::outbox::Outbox;

const FALLBACK: &str = "Я тебя не очень понял\nПожалуйста, воспользуйся кнопками внизу.";

/// Free-text router. Active flows get first claim on the message, in fixed
/// priority order; only unclaimed text is treated as a menu press.
pub async fn text_handler(
    msg: Message,
    db: DatabaseManager,
    engine: Arc<FlowEngine>,
    outbox: Arc<dyn Outbox>,
) -> HandlerResult {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(from) = msg.from() else {
        return Ok(());
    };
    let user = UserIdentity::from_telegram(from);

    match engine.dispatch(&user, text).await {
        Ok(true) => return Ok(()),
        Ok(false) => {}
        Err(e) => {
            tracing::error!("Flow handling failed for {}: {}", user.telegram_id, e);
            return Ok(());
        }
    }

    let chat_id = msg.chat.id.0;
    let result = match text {
        buttons::ASK_QUESTION => engine.start_question(&user).await,
        buttons::PROGRAM => program::send_schedule(outbox.as_ref(), &db.pool, chat_id).await,
        buttons::NETWORKING => engine.start_networking(&user).await,
        buttons::DONATE => engine.start_donation(&user).await,
        buttons::MY_QUESTIONS => {
            questions::send_speaker_questions(outbox.as_ref(), &db.pool, user.telegram_id).await
        }
        _ => outbox.send_text(chat_id, FALLBACK).await,
    };

    if let Err(e) = result {
        tracing::error!("Menu handling failed for {}: {}", user.telegram_id, e);
    }

    Ok(())
}
