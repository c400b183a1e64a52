use std::sync::Arc;
use teloxide::prelude::*;

use crate::bot::commands::{program, questions, subscriptions, Command};
use crate::bot::handlers::HandlerResult;
use crate::bot::keyboards;
use crate::database::connection::DatabaseManager;
use crate::database::models::Speaker;
use crate::flows::UserIdentity;
use crate::services::outbox::Outbox;

pub async fn command_handler(
    bot: Bot,
    msg: Message,
    cmd: Command,
    db: DatabaseManager,
    outbox: Arc<dyn Outbox>,
) -> HandlerResult {
    let Some(from) = msg.from() else {
        return Ok(());
    };
    let user = UserIdentity::from_telegram(from);

    match cmd {
        Command::Start | Command::Update => {
            send_greeting(&bot, &msg, &db, &user).await?;
        }
        Command::Help => {
            bot.send_message(msg.chat.id, help_text()).await?;
        }
        Command::MyQuestions => {
            log_and_ignore(
                questions::send_speaker_questions(outbox.as_ref(), &db.pool, user.telegram_id)
                    .await,
                "my_questions",
                user.telegram_id,
            );
        }
        Command::Subscribe => {
            log_and_ignore(
                subscriptions::subscribe(outbox.as_ref(), &db.pool, &user).await,
                "subscribe",
                user.telegram_id,
            );
        }
        Command::Unsubscribe => {
            log_and_ignore(
                subscriptions::unsubscribe(outbox.as_ref(), &db.pool, &user).await,
                "unsubscribe",
                user.telegram_id,
            );
        }
        Command::Settings => {
            send_settings(&bot, &msg, &db, &user).await?;
        }
        Command::Program => {
            log_and_ignore(
                program::send_schedule(outbox.as_ref(), &db.pool, msg.chat.id.0).await,
                "program",
                user.telegram_id,
            );
        }
    }
    Ok(())
}

fn log_and_ignore(result: anyhow::Result<()>, command: &str, telegram_id: i64) {
    if let Err(e) = result {
        tracing::error!("/{} failed for {}: {}", command, telegram_id, e);
    }
}

async fn send_greeting(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    user: &UserIdentity,
) -> ResponseResult<()> {
    let is_speaker = Speaker::find_by_telegram_id(&db.pool, user.telegram_id)
        .await
        .map(|s| s.is_some())
        .unwrap_or(false);

    let name = if user.first_name.is_empty() {
        "гость"
    } else {
        user.first_name.as_str()
    };

    let text = if is_speaker {
        format!(
            "Привет, {}!\n\n\
             Я бот PythonMeetup.\n\n\
             Что могу для спикеров:\n\
             • Показать вопросы к твоим выступлениям\n\
             • Показать программу митапа\n\
             • Помочь познакомиться с другими разработчиками\n\
             • Присылать уведомления об изменениях\n\n\
             Выбери, чем хочешь заняться сейчас:",
            name
        )
    } else {
        format!(
            "Привет, {}!\n\n\
             Я бот PythonMeetup.\n\n\
             Что умею:\n\
             • Передать твой вопрос текущему спикеру\n\
             • Показать программу митапа\n\
             • Помочь познакомиться с другими разработчиками\n\
             • Дать ссылку, чтобы поддержать мероприятие\n\
             • Присылать уведомления об изменениях\n\n\
             Выбери, чем хочешь заняться сейчас:",
            name
        )
    };

    bot.send_message(msg.chat.id, text)
        .reply_markup(keyboards::main_menu(is_speaker))
        .await?;
    Ok(())
}

fn help_text() -> &'static str {
    "Команды:\n\
     /start — описание и главное меню\n\
     /help — помощь\n\
     /update — обновить меню\n\
     /subscribe — подписаться на уведомления\n\
     /unsubscribe — отписаться от уведомлений\n\
     /settings — настройки уведомлений\n\
     /program — программа митапа\n\
     /my_questions — для спикеров: посмотреть вопросы\n\n\
     Основные действия доступны через кнопки внизу экрана."
}

async fn send_settings(
    bot: &Bot,
    msg: &Message,
    db: &DatabaseManager,
    user: &UserIdentity,
) -> ResponseResult<()> {
    use subscriptions::SettingsView;

    match subscriptions::load_settings_view(&db.pool, user.telegram_id).await {
        Ok(SettingsView::Ready(event, subscription)) => {
            let (text, keyboard) = subscriptions::render_settings(&event, &subscription);
            bot.send_message(msg.chat.id, text)
                .reply_markup(keyboard)
                .await?;
        }
        Ok(SettingsView::NotRegistered) => {
            bot.send_message(msg.chat.id, subscriptions::not_registered_text())
                .await?;
        }
        Ok(SettingsView::NoActiveEvent) => {
            bot.send_message(msg.chat.id, subscriptions::no_active_event_text())
                .await?;
        }
        Err(e) => {
            tracing::error!("/settings failed for {}: {}", user.telegram_id, e);
            bot.send_message(
                msg.chat.id,
                "Произошла ошибка при загрузке настроек. Попробуйте позже",
            )
            .await?;
        }
    }
    Ok(())
}
