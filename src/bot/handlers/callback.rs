use teloxide::prelude::*;

use crate::bot::commands::subscriptions::render_settings;
use crate::bot::handlers::HandlerResult;
use crate::database::connection::DatabaseManager;
use crate::database::models::{Event, NotificationToggle, Subscription};

const INFO_PROGRAM: &str =
    "Изменения программы: сообщу, если доклад перенесут, добавят или отменят.";
const INFO_EVENTS: &str = "Новые мероприятия: сообщу, когда появится следующий митап.";
const INFO_REMINDERS: &str = "Напоминания: напомню незадолго до начала доклада или митапа.";

pub async fn callback_handler(bot: Bot, q: CallbackQuery, db: DatabaseManager) -> HandlerResult {
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id)
            .text("Неизвестное действие")
            .await?;
        return Ok(());
    };

    tracing::info!(
        "Callback '{}' from user {} (@{})",
        data,
        q.from.id,
        q.from.username.as_deref().unwrap_or("-")
    );

    if let Some((toggle, subscription_id)) = parse_toggle(&data) {
        return handle_toggle(bot, q, &db, toggle, subscription_id).await;
    }

    match data.as_str() {
        "info_program" => {
            bot.answer_callback_query(q.id)
                .text(INFO_PROGRAM)
                .show_alert(true)
                .await?;
        }
        "info_events" => {
            bot.answer_callback_query(q.id)
                .text(INFO_EVENTS)
                .show_alert(true)
                .await?;
        }
        "info_reminders" => {
            bot.answer_callback_query(q.id)
                .text(INFO_REMINDERS)
                .show_alert(true)
                .await?;
        }
        _ => {
            bot.answer_callback_query(q.id)
                .text("Неизвестное действие")
                .await?;
        }
    }

    Ok(())
}

/// Recognizes `toggle_program_<id>`, `toggle_events_<id>` and
/// `toggle_reminders_<id>` payloads.
pub fn parse_toggle(data: &str) -> Option<(NotificationToggle, i64)> {
    let rest = data.strip_prefix("toggle_")?;
    let (toggle, id_str) = if let Some(id) = rest.strip_prefix("program_") {
        (NotificationToggle::ProgramChanges, id)
    } else if let Some(id) = rest.strip_prefix("events_") {
        (NotificationToggle::NewEvents, id)
    } else if let Some(id) = rest.strip_prefix("reminders_") {
        (NotificationToggle::Reminders, id)
    } else {
        return None;
    };

    id_str.parse().ok().map(|id| (toggle, id))
}

async fn handle_toggle(
    bot: Bot,
    q: CallbackQuery,
    db: &DatabaseManager,
    toggle: NotificationToggle,
    subscription_id: i64,
) -> HandlerResult {
    match Subscription::toggle(&db.pool, subscription_id, toggle).await {
        Ok(Some(subscription)) => {
            bot.answer_callback_query(q.id)
                .text("Настройки обновлены")
                .await?;

            // Re-render the settings message so the visible state matches.
            if let Some(message) = q.message {
                match Event::find_by_id(&db.pool, subscription.event_id).await {
                    Ok(Some(event)) => {
                        let (text, keyboard) = render_settings(&event, &subscription);
                        bot.edit_message_text(message.chat.id, message.id, text)
                            .reply_markup(keyboard)
                            .await?;
                    }
                    Ok(None) => {
                        tracing::warn!(
                            "Subscription {} points to missing event {}",
                            subscription.id,
                            subscription.event_id
                        );
                    }
                    Err(e) => {
                        tracing::error!("Failed to reload event for settings: {}", e);
                    }
                }
            }
        }
        Ok(None) => {
            bot.answer_callback_query(q.id)
                .text("Подписка не найдена")
                .await?;
        }
        Err(e) => {
            tracing::error!("Failed to toggle subscription {}: {}", subscription_id, e);
            bot.answer_callback_query(q.id)
                .text("Не получилось обновить настройки, попробуйте позже")
                .await?;
        }
    }

    Ok(())
}
