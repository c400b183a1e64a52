use anyhow::Result;
use tracing::{error, info};

use crate::database::models::{Donation, Participant};
use crate::flows::session::{FlowState, Session};
use crate::flows::{FlowEngine, UserIdentity};
use crate::utils::datetime::{format_date_ru, parse_rfc3339};

/// Phrases that abort the donation flow, compared case-insensitively after
/// trimming.
const CANCEL_PHRASES: [&str; 6] = [
    "в другой раз",
    "не сейчас",
    "нет",
    "потом",
    "отмена",
    "отменить",
];

const INTRO: &str = "Спасибо, что хочешь поддержать митап!\n\n\
    Донаты помогают оплачивать площадку и делать следующие мероприятия лучше.\n\n\
    Если хочешь задонатить, напиши сумму в рублях цифрами (например: 300 или 500).\n\
    Если передумал, просто напиши «В другой раз».";

const CANCELLED: &str = "Без проблем!\n\
    Спасибо, что вообще задумался поддержать митап.\n\
    Можешь в любой момент вернуться к донату через кнопку «Поддержать митап».";

const NOT_A_NUMBER: &str = "Я не понял сумму\n\
    Пожалуйста, напиши только число в рублях, например: 200 или 500.\n\
    Или напиши «В другой раз», если передумал.";

const NOT_POSITIVE: &str = "Сумма должна быть больше нуля\n\
    Напиши, пожалуйста, сумму в рублях или «В другой раз».";

const SAVE_FAILED: &str = "Произошла ошибка при обработке доната. Попробуйте позже";

pub(crate) fn is_cancel_phrase(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    CANCEL_PHRASES.contains(&normalized.as_str())
}

/// Digit-concatenation parsing, deliberately not decimal parsing: every
/// non-digit character is discarded, so "у меня 300 руб" → 300, "12.50" →
/// 1250 and "-5" → 5. `None` when no digits remain or the digits overflow.
pub(crate) fn extract_amount(text: &str) -> Option<i64> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

pub(crate) async fn start(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
) -> Result<()> {
    session.state = FlowState::AwaitingDonationAmount;
    engine.outbox().send_text(user.telegram_id, INTRO).await?;
    Ok(())
}

pub(crate) async fn handle_if_active(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
    text: &str,
) -> Result<bool> {
    match std::mem::take(&mut session.state) {
        FlowState::AwaitingDonationAmount => {}
        other => {
            session.state = other;
            return Ok(false);
        }
    }

    if is_cancel_phrase(text) {
        engine
            .outbox()
            .send_text(user.telegram_id, CANCELLED)
            .await?;
        return Ok(true);
    }

    let amount = match extract_amount(text) {
        None => {
            session.state = FlowState::AwaitingDonationAmount;
            engine
                .outbox()
                .send_text(user.telegram_id, NOT_A_NUMBER)
                .await?;
            return Ok(true);
        }
        Some(amount) if amount <= 0 => {
            session.state = FlowState::AwaitingDonationAmount;
            engine
                .outbox()
                .send_text(user.telegram_id, NOT_POSITIVE)
                .await?;
            return Ok(true);
        }
        Some(amount) => amount,
    };

    match record_donation(engine, user, amount).await {
        Ok(donation) => {
            let when = parse_rfc3339(&donation.created_at)
                .map(|dt| format_date_ru(&dt))
                .unwrap_or_else(|_| donation.created_at.clone());
            let confirmation = format!(
                "Спасибо! Ты выбрал(а) поддержать митап на {} ₽\n\n\
                 Заявка {} от {}\n\
                 Ссылка для оплаты: https://example.com/donation",
                donation.amount, donation.id, when
            );
            engine
                .outbox()
                .send_text(user.telegram_id, &confirmation)
                .await?;
        }
        Err(e) => {
            error!("Failed to save donation from {}: {}", user.telegram_id, e);
            engine
                .outbox()
                .send_text(user.telegram_id, SAVE_FAILED)
                .await?;
        }
    }

    Ok(true)
}

async fn record_donation(
    engine: &FlowEngine,
    user: &UserIdentity,
    amount: i64,
) -> Result<Donation> {
    let pool = engine.pool();

    let mut participant = Participant::get_or_create(
        pool,
        user.telegram_id,
        user.username.as_deref(),
        &user.full_name(),
    )
    .await?;
    participant
        .refresh_identity(pool, user.username.as_deref(), &user.full_name())
        .await?;

    let donation = Donation::create(pool, participant.id, amount).await?;

    info!(
        "Donation intent from {} (@{}): {} RUB",
        user.telegram_id,
        user.username.as_deref().unwrap_or("-"),
        amount
    );
    Ok(donation)
}
