use anyhow::Result;
use std::collections::HashSet;
use tracing::error;

use crate::flows::candidates::Candidate;
use crate::flows::session::{FlowState, ProfileForm, Session};
use crate::flows::{FlowEngine, UserIdentity};

/// The questionnaire, one prompt per `ProfileForm` field, in answer order.
const PROFILE_QUESTIONS: [&str; 3] = [
    "Расскажи в двух словах, кто ты и чем занимаешься (например: Python backend, data scientist, DevOps)?",
    "Сколько у тебя опыта в IT? (например: 6 месяцев, 2 года, 10+ лет)",
    "С кем хочешь познакомиться на митапе? (джуны, сеньоры, тимлиды, работодатели, единомышленники и т.п.)",
];

const INTRO: &str = "Классно, что хочешь познакомиться с другими разработчиками!\n\n\
    Как это работает:\n\
    • Ты заполняешь короткую анкету о себе\n\
    • Я буду подбирать тебе других участников митапа\n\
    • Я покажу их анкету и контакт в Telegram\n\
    • Если не понравится, то можно будет пропустить и попросить следующего\n\n\
    Давай начнём с анкеты";

const INTRO_AGAIN: &str = "Снова нетворкинг? Отлично!\n\
    У тебя уже есть анкета, я попробую подобрать тебе новых людей.";

const PROFILE_SAVED: &str = "Готово! Я сохранил твою анкету для нетворкинга.\n\n\
    Дальше я буду подбирать тебе других участников митапа.";

const PROFILE_SAVE_FAILED: &str =
    "Произошла ошибка при сохранении анкеты. Попробуйте позже";

const NO_CANDIDATES_YET: &str = "Ты один из первых, кто заполнил анкету\n\
    Пока других анкет нет, но как только люди начнут заполнять, я смогу кого-то тебе предложить.\n\n\
    Чуть позже просто снова нажми «Нетворкинг», чтобы попробовать ещё раз.";

const NO_MORE_CANDIDATES: &str = "Похоже, больше анкет пока нет\n\
    Можешь вернуться позже — нажми «Нетворкинг», когда захочешь продолжить.";

const STOPPED: &str = "Окей, остановимся на этом\n\
    Если захочешь продолжить знакомиться, снова нажми «Нетворкинг».";

const BROWSE_HINT: &str = "Если не хочешь общаться с текущим человеком, напиши «Следующий».\n\
    Если пока хватит, напиши «Стоп».\n\
    А написать ему можно просто перейдя по нику в сообщении выше";

pub(crate) async fn start(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
) -> Result<()> {
    if session.has_profile {
        engine
            .outbox()
            .send_text(user.telegram_id, INTRO_AGAIN)
            .await?;
        start_matching(engine, session, user).await
    } else {
        engine.outbox().send_text(user.telegram_id, INTRO).await?;
        session.state = FlowState::FillingProfile {
            step: 0,
            form: ProfileForm::default(),
        };
        engine
            .outbox()
            .send_text(user.telegram_id, PROFILE_QUESTIONS[0])
            .await?;
        Ok(())
    }
}

pub(crate) async fn handle_if_active(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
    text: &str,
) -> Result<bool> {
    match std::mem::take(&mut session.state) {
        FlowState::FillingProfile { step, form } => {
            handle_profile_answer(engine, session, user, text, step, form).await?;
            Ok(true)
        }
        FlowState::BrowsingCandidates { seen } => {
            handle_browse_message(engine, session, user, text, seen).await?;
            Ok(true)
        }
        other => {
            session.state = other;
            Ok(false)
        }
    }
}

async fn handle_profile_answer(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
    text: &str,
    step: usize,
    mut form: ProfileForm,
) -> Result<()> {
    form.set_answer(step, text);
    let next_step = step + 1;

    if next_step < PROFILE_QUESTIONS.len() {
        session.state = FlowState::FillingProfile {
            step: next_step,
            form,
        };
        engine
            .outbox()
            .send_text(user.telegram_id, PROFILE_QUESTIONS[next_step])
            .await?;
        return Ok(());
    }

    if let Err(e) = engine.candidates().save_profile(user, &form).await {
        error!(
            "Failed to save networking profile for {}: {}",
            user.telegram_id, e
        );
        engine
            .outbox()
            .send_text(user.telegram_id, PROFILE_SAVE_FAILED)
            .await?;
        return Ok(());
    }

    session.has_profile = true;
    engine
        .outbox()
        .send_text(user.telegram_id, PROFILE_SAVED)
        .await?;

    // Browsing starts immediately, no extra user action needed.
    start_matching(engine, session, user).await
}

async fn start_matching(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
) -> Result<()> {
    let mut seen = HashSet::new();

    match engine
        .candidates()
        .next_candidate(user.telegram_id, &seen)
        .await?
    {
        None => {
            session.state = FlowState::Idle;
            engine
                .outbox()
                .send_text(user.telegram_id, NO_CANDIDATES_YET)
                .await?;
        }
        Some((index, candidate)) => {
            seen.insert(index);
            session.state = FlowState::BrowsingCandidates { seen };
            show_candidate(engine, user, &candidate).await?;
        }
    }
    Ok(())
}

async fn handle_browse_message(
    engine: &FlowEngine,
    session: &mut Session,
    user: &UserIdentity,
    text: &str,
    mut seen: HashSet<usize>,
) -> Result<()> {
    let normalized = text.trim().to_lowercase();

    if normalized.starts_with("след") {
        match engine
            .candidates()
            .next_candidate(user.telegram_id, &seen)
            .await?
        {
            None => {
                session.state = FlowState::Idle;
                engine
                    .outbox()
                    .send_text(user.telegram_id, NO_MORE_CANDIDATES)
                    .await?;
            }
            Some((index, candidate)) => {
                seen.insert(index);
                session.state = FlowState::BrowsingCandidates { seen };
                show_candidate(engine, user, &candidate).await?;
            }
        }
        return Ok(());
    }

    if normalized.starts_with("стоп") || normalized == "хватит" || normalized == "stop" {
        session.state = FlowState::Idle;
        engine.outbox().send_text(user.telegram_id, STOPPED).await?;
        return Ok(());
    }

    // Anything else keeps the current candidate and repeats the instructions.
    session.state = FlowState::BrowsingCandidates { seen };
    engine
        .outbox()
        .send_text(user.telegram_id, BROWSE_HINT)
        .await?;
    Ok(())
}

async fn show_candidate(
    engine: &FlowEngine,
    user: &UserIdentity,
    candidate: &Candidate,
) -> Result<()> {
    let contact = match &candidate.username {
        Some(username) => format!("Связаться: @{}", username),
        None => "Связаться: ник в Telegram не указан".to_string(),
    };

    let text = format!(
        "Нашёл тебе человека для знакомства:\n\n\
         Имя: {}\n\
         Кто: {}\n\
         Опыт: {}\n\
         Ищет: {}\n\n\
         {}\n\n\
         Если не хочешь общаться с этим человеком, напиши «Следующий».\n\
         Если пока хватит, напиши «Стоп».",
        candidate.full_name, candidate.role, candidate.experience, candidate.looking_for, contact
    );

    engine.outbox().send_text(user.telegram_id, &text).await?;
    Ok(())
}
