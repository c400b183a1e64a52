use anyhow::Result;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::error;

use crate::database::models::{Event, Participant, Subscription};
use crate::flows::UserIdentity;
use crate::services::outbox::Outbox;

const NO_ACTIVE_EVENT: &str = "Сейчас нет активных мероприятий, подписываться пока не на что.";
const NOT_REGISTERED: &str = "Я тебя ещё не знаю.\n\
    Задай вопрос спикеру, заполни анкету нетворкинга или нажми /subscribe — и я тебя запомню.";
const NOT_SUBSCRIBED: &str = "У тебя пока нет ни одной подписки.";
const SUBSCRIBE_FAILED: &str = "Произошла ошибка при оформлении подписки. Попробуйте позже";

pub async fn subscribe(
    outbox: &dyn Outbox,
    pool: &sqlx::SqlitePool,
    user: &UserIdentity,
) -> Result<()> {
    match subscribe_to_active_event(pool, user).await {
        Ok(Some(event_title)) => {
            let text = format!(
                "Готово! Ты подписан(а) на уведомления о «{}».\n\
                 Управлять уведомлениями можно через /settings.",
                event_title
            );
            outbox.send_text(user.telegram_id, &text).await
        }
        Ok(None) => outbox.send_text(user.telegram_id, NO_ACTIVE_EVENT).await,
        Err(e) => {
            error!("Failed to subscribe {}: {}", user.telegram_id, e);
            outbox.send_text(user.telegram_id, SUBSCRIBE_FAILED).await
        }
    }
}

async fn subscribe_to_active_event(
    pool: &sqlx::SqlitePool,
    user: &UserIdentity,
) -> Result<Option<String>> {
    let Some(event) = Event::find_active(pool).await? else {
        return Ok(None);
    };

    let participant = Participant::get_or_create(
        pool,
        user.telegram_id,
        user.username.as_deref(),
        &user.full_name(),
    )
    .await?;

    Subscription::get_or_create(pool, participant.id, event.id).await?;
    Ok(Some(event.title))
}

pub async fn unsubscribe(
    outbox: &dyn Outbox,
    pool: &sqlx::SqlitePool,
    user: &UserIdentity,
) -> Result<()> {
    let removed = match Participant::find_by_telegram_id(pool, user.telegram_id).await {
        Ok(Some(participant)) => {
            match Subscription::delete_for_participant(pool, participant.id).await {
                Ok(count) => count,
                Err(e) => {
                    error!("Failed to unsubscribe {}: {}", user.telegram_id, e);
                    return outbox.send_text(user.telegram_id, SUBSCRIBE_FAILED).await;
                }
            }
        }
        Ok(None) => 0,
        Err(e) => {
            error!("Failed to look up participant {}: {}", user.telegram_id, e);
            return outbox.send_text(user.telegram_id, SUBSCRIBE_FAILED).await;
        }
    };

    if removed == 0 {
        outbox.send_text(user.telegram_id, NOT_SUBSCRIBED).await
    } else {
        outbox
            .send_text(
                user.telegram_id,
                "Готово, я отписал тебя от всех уведомлений.\n\
                 Подписаться снова можно через /subscribe.",
            )
            .await
    }
}

/// Builds the settings view for one subscription: current toggle states plus
/// an inline keyboard of (toggle, info) button rows.
pub fn render_settings(event: &Event, subscription: &Subscription) -> (String, InlineKeyboardMarkup) {
    let text = format!(
        "Настройки уведомлений для «{}»:\n\n\
         Изменения программы: {}\n\
         Новые мероприятия: {}\n\
         Напоминания: {}\n\n\
         Нажми на кнопку, чтобы переключить.",
        event.title,
        on_off(subscription.notify_program_changes),
        on_off(subscription.notify_new_events),
        on_off(subscription.notify_reminders),
    );

    let keyboard = InlineKeyboardMarkup::new(vec![
        vec![
            InlineKeyboardButton::callback(
                format!(
                    "Изменения программы: {}",
                    on_off(subscription.notify_program_changes)
                ),
                format!("toggle_program_{}", subscription.id),
            ),
            InlineKeyboardButton::callback("ℹ️", "info_program"),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!(
                    "Новые мероприятия: {}",
                    on_off(subscription.notify_new_events)
                ),
                format!("toggle_events_{}", subscription.id),
            ),
            InlineKeyboardButton::callback("ℹ️", "info_events"),
        ],
        vec![
            InlineKeyboardButton::callback(
                format!("Напоминания: {}", on_off(subscription.notify_reminders)),
                format!("toggle_reminders_{}", subscription.id),
            ),
            InlineKeyboardButton::callback("ℹ️", "info_reminders"),
        ],
    ]);

    (text, keyboard)
}

fn on_off(enabled: bool) -> &'static str {
    if enabled {
        "включены ✅"
    } else {
        "выключены ❌"
    }
}

/// Resolves what `/settings` should show: the subscription of the active
/// event, created lazily the first time settings are opened. The other
/// variants map to guided messages, not errors.
pub enum SettingsView {
    Ready(Event, Subscription),
    NotRegistered,
    NoActiveEvent,
}

pub async fn load_settings_view(
    pool: &sqlx::SqlitePool,
    telegram_id: i64,
) -> Result<SettingsView> {
    let Some(participant) = Participant::find_by_telegram_id(pool, telegram_id).await? else {
        return Ok(SettingsView::NotRegistered);
    };

    let Some(event) = Event::find_active(pool).await? else {
        return Ok(SettingsView::NoActiveEvent);
    };

    let subscription = Subscription::get_or_create(pool, participant.id, event.id).await?;
    Ok(SettingsView::Ready(event, subscription))
}

pub fn not_registered_text() -> &'static str {
    NOT_REGISTERED
}

pub fn no_active_event_text() -> &'static str {
    NO_ACTIVE_EVENT
}
