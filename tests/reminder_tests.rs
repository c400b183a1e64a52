mod common;

use std::sync::Arc;

use common::{seed_event, seed_speaker, seed_speech, setup_test_db, RecordingOutbox};
use meetup_companion_bot::database::models::{Participant, Subscription};
use meetup_companion_bot::services::events::{self, ProgramEvent};
use meetup_companion_bot::services::notifier::NotificationService;
use meetup_companion_bot::services::reminder::ReminderService;

#[tokio::test]
async fn sweep_emits_reminder_for_speech_starting_soon() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();
    let db_arc = Arc::new(db.clone());

    // The event itself is far away; only the speech enters the lead window.
    let event = seed_event(&db, "PythonMeetup", 300).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    let soon = seed_speech(&db, &event, &speaker, "Скорый доклад", 10, 40).await;
    seed_speech(&db, &event, &speaker, "Поздний доклад", 120, 150).await;

    let (tx, mut rx) = events::channel();
    let service = ReminderService::new(db_arc, tx, 15).await.unwrap();

    service.sweep_now().await.unwrap();

    assert_eq!(
        rx.try_recv().ok(),
        Some(ProgramEvent::ReminderDue {
            event_id: event.id,
            speech_id: Some(soon.id),
        })
    );
    // Nothing else is due yet.
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sweep_does_not_emit_twice_for_the_same_speech() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();
    let db_arc = Arc::new(db.clone());

    let event = seed_event(&db, "PythonMeetup", 300).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    let speech = seed_speech(&db, &event, &speaker, "Скорый доклад", 10, 40).await;

    let participant = Participant::get_or_create(&db.pool, 1, None, "Гость")
        .await
        .unwrap();
    Subscription::get_or_create(&db.pool, participant.id, event.id)
        .await
        .unwrap();

    let (tx, mut rx) = events::channel();
    let service = ReminderService::new(db_arc, tx, 15).await.unwrap();

    service.sweep_now().await.unwrap();
    let due = rx.try_recv().unwrap();
    assert!(matches!(due, ProgramEvent::ReminderDue { .. }));

    // Delivering the reminder records it against the speech...
    let outbox = Arc::new(RecordingOutbox::default());
    NotificationService::new(db.clone(), outbox)
        .notify_reminder(&event, Some(&speech))
        .await
        .unwrap();

    // ...so the next sweep stays quiet.
    service.sweep_now().await.unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn sweep_emits_event_level_reminder_without_speeches() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();
    let db_arc = Arc::new(db.clone());

    let event = seed_event(&db, "PythonMeetup", 10).await;

    let (tx, mut rx) = events::channel();
    let service = ReminderService::new(db_arc, tx, 15).await.unwrap();

    service.sweep_now().await.unwrap();

    assert_eq!(
        rx.try_recv().ok(),
        Some(ProgramEvent::ReminderDue {
            event_id: event.id,
            speech_id: None,
        })
    );
}

#[tokio::test]
async fn sweep_ignores_inactive_events() {
    let (db, _temp_dir) = setup_test_db().await.unwrap();
    let db_arc = Arc::new(db.clone());

    use meetup_companion_bot::database::models::Event;
    use meetup_companion_bot::utils::datetime::to_rfc3339;
    let soon = to_rfc3339(&(chrono::Utc::now() + chrono::Duration::minutes(10)));
    Event::create(&db.pool, "Черновик", "", &soon, false)
        .await
        .unwrap();

    let (tx, mut rx) = events::channel();
    let service = ReminderService::new(db_arc, tx, 15).await.unwrap();

    service.sweep_now().await.unwrap();
    assert!(rx.try_recv().is_err());
}
