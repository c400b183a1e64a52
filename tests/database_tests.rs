mod common;

use common::{seed_event, seed_speaker, seed_speech, setup_test_db};
use meetup_companion_bot::database::models::{
    Donation, Event, NotificationToggle, Participant, Question, Speech, Subscription,
};
use meetup_companion_bot::utils::datetime::now_rfc3339;

#[tokio::test]
async fn participant_get_or_create_is_idempotent() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let first = Participant::get_or_create(&db.pool, 42, Some("alice"), "Алиса")
        .await
        .unwrap();
    let second = Participant::get_or_create(&db.pool, 42, Some("alice_new"), "Алиса Н.")
        .await
        .unwrap();

    // Same row, defaults applied only at creation time.
    assert_eq!(first.id, second.id);
    assert_eq!(second.username, "alice");
    assert_eq!(second.full_name, "Алиса");

    let all = Participant::all(&db.pool).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn participant_refresh_identity_updates_on_drift() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let mut participant = Participant::get_or_create(&db.pool, 42, Some("alice"), "Алиса")
        .await
        .unwrap();
    participant
        .refresh_identity(&db.pool, Some("alice_new"), "Алиса Новая")
        .await
        .unwrap();

    let reloaded = Participant::find_by_telegram_id(&db.pool, 42)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reloaded.username, "alice_new");
    assert_eq!(reloaded.full_name, "Алиса Новая");
}

#[tokio::test]
async fn active_speech_lookup_uses_time_window() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let event = seed_event(&db, "PythonMeetup", 60).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;

    seed_speech(&db, &event, &speaker, "Прошедший", -120, -60).await;
    let current = seed_speech(&db, &event, &speaker, "Текущий", -10, 20).await;
    seed_speech(&db, &event, &speaker, "Будущий", 60, 120).await;

    let active = Speech::find_active_at(&db.pool, &now_rfc3339())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(active.id, current.id);
    assert_eq!(active.title, "Текущий");
}

#[tokio::test]
async fn no_active_speech_outside_any_window() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let event = seed_event(&db, "PythonMeetup", 60).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    seed_speech(&db, &event, &speaker, "Будущий", 30, 90).await;

    let active = Speech::find_active_at(&db.pool, &now_rfc3339())
        .await
        .unwrap();
    assert!(active.is_none());
}

#[tokio::test]
async fn subscription_unique_per_participant_event() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let event = seed_event(&db, "PythonMeetup", 60).await;
    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();

    let first = Subscription::get_or_create(&db.pool, participant.id, event.id)
        .await
        .unwrap();
    let second = Subscription::get_or_create(&db.pool, participant.id, event.id)
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert!(first.notify_program_changes);
    assert!(first.notify_new_events);
    assert!(first.notify_reminders);
}

#[tokio::test]
async fn toggling_twice_restores_original_value() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let event = seed_event(&db, "PythonMeetup", 60).await;
    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();
    let subscription = Subscription::get_or_create(&db.pool, participant.id, event.id)
        .await
        .unwrap();

    for toggle in [
        NotificationToggle::ProgramChanges,
        NotificationToggle::NewEvents,
        NotificationToggle::Reminders,
    ] {
        let once = Subscription::toggle(&db.pool, subscription.id, toggle)
            .await
            .unwrap()
            .unwrap();
        let twice = Subscription::toggle(&db.pool, subscription.id, toggle)
            .await
            .unwrap()
            .unwrap();

        match toggle {
            NotificationToggle::ProgramChanges => {
                assert!(!once.notify_program_changes);
                assert!(twice.notify_program_changes);
            }
            NotificationToggle::NewEvents => {
                assert!(!once.notify_new_events);
                assert!(twice.notify_new_events);
            }
            NotificationToggle::Reminders => {
                assert!(!once.notify_reminders);
                assert!(twice.notify_reminders);
            }
        }
    }
}

#[tokio::test]
async fn toggle_of_missing_subscription_reports_not_found() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let result = Subscription::toggle(&db.pool, 999, NotificationToggle::Reminders)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn unsubscribe_removes_all_rows_of_a_participant() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let first_event = seed_event(&db, "Первый", 60).await;
    let second_event = seed_event(&db, "Второй", 120).await;
    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();

    Subscription::get_or_create(&db.pool, participant.id, first_event.id)
        .await
        .unwrap();
    Subscription::get_or_create(&db.pool, participant.id, second_event.id)
        .await
        .unwrap();

    let removed = Subscription::delete_for_participant(&db.pool, participant.id)
        .await
        .unwrap();
    assert_eq!(removed, 2);
    assert!(!Subscription::has_any(&db.pool, participant.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn questions_belong_to_speech_and_participant() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let event = seed_event(&db, "PythonMeetup", 60).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    let speech = seed_speech(&db, &event, &speaker, "Доклад", -10, 30).await;
    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();

    let question = Question::create(&db.pool, speech.id, participant.id, "Почему Rust?")
        .await
        .unwrap();
    assert!(!question.is_answered);

    let questions = Question::find_by_speech(&db.pool, speech.id).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].participant_id, participant.id);
}

#[tokio::test]
async fn deleting_speech_cascades_to_questions() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let event = seed_event(&db, "PythonMeetup", 60).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    let speech = seed_speech(&db, &event, &speaker, "Доклад", -10, 30).await;
    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();
    Question::create(&db.pool, speech.id, participant.id, "Вопрос")
        .await
        .unwrap();

    let deleted = Speech::delete(&db.pool, speech.id).await.unwrap().unwrap();
    assert_eq!(deleted.id, speech.id);

    let questions = Question::find_by_speech(&db.pool, speech.id).await.unwrap();
    assert!(questions.is_empty());
}

#[tokio::test]
async fn donations_store_positive_amounts() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();
    let donation = Donation::create(&db.pool, participant.id, 300).await.unwrap();
    assert_eq!(donation.amount, 300);
    assert!(!donation.id.is_empty()); // UUID should be generated

    let donations = Donation::find_by_participant(&db.pool, participant.id)
        .await
        .unwrap();
    assert_eq!(donations.len(), 1);
}

#[tokio::test]
async fn settings_view_guides_before_registration_and_creates_lazily() {
    use meetup_companion_bot::bot::commands::subscriptions::{load_settings_view, SettingsView};

    let (db, _temp_dir) = setup_test_db().await.unwrap();

    // Unknown user: guided message, nothing is created.
    assert!(matches!(
        load_settings_view(&db.pool, 1).await.unwrap(),
        SettingsView::NotRegistered
    ));

    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();
    assert!(matches!(
        load_settings_view(&db.pool, 1).await.unwrap(),
        SettingsView::NoActiveEvent
    ));

    let event = seed_event(&db, "PythonMeetup", 60).await;
    match load_settings_view(&db.pool, 1).await.unwrap() {
        SettingsView::Ready(shown_event, subscription) => {
            assert_eq!(shown_event.id, event.id);
            assert_eq!(subscription.participant_id, participant.id);
            assert!(subscription.notify_program_changes);
        }
        _ => panic!("expected a ready settings view"),
    }

    // Opening settings twice reuses the lazily created subscription.
    assert!(Subscription::has_any(&db.pool, participant.id)
        .await
        .unwrap());
}

#[tokio::test]
async fn active_event_is_the_nearest_one() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();

    seed_event(&db, "Дальний", 2880).await;
    let near = seed_event(&db, "Ближний", 60).await;
    Event::create(
        &db.pool,
        "Неактивный",
        "",
        &now_rfc3339(),
        false,
    )
    .await
    .unwrap();

    let active = Event::find_active(&db.pool).await.unwrap().unwrap();
    assert_eq!(active.id, near.id);

    let all_active = Event::find_all_active(&db.pool).await.unwrap();
    assert_eq!(all_active.len(), 2);
}
