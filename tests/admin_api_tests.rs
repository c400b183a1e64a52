mod common;

use axum_test::TestServer;
use common::{seed_event, seed_speaker, setup_test_db};
use meetup_companion_bot::database::connection::DatabaseManager;
use meetup_companion_bot::database::models::{Event, Speech};
use meetup_companion_bot::services::admin::{self, AdminState};
use meetup_companion_bot::services::events::{self, ProgramEvent, ProgramEventReceiver};
use serde::Serialize;
use tempfile::TempDir;

fn test_server(db: &DatabaseManager) -> (TestServer, ProgramEventReceiver) {
    let (tx, rx) = events::channel();
    let router = admin::router(AdminState {
        db: db.clone(),
        events: tx,
    });
    let server = TestServer::new(router).expect("Failed to create test server");
    (server, rx)
}

async fn setup() -> (DatabaseManager, TempDir) {
    setup_test_db().await.expect("Failed to set up database")
}

#[derive(Serialize)]
struct EventBody<'a> {
    title: &'a str,
    description: &'a str,
    date: &'a str,
}

#[derive(Serialize)]
struct SpeechBody<'a> {
    event_id: i64,
    speaker_id: i64,
    title: &'a str,
    start_time: &'a str,
    end_time: &'a str,
}

#[tokio::test]
async fn creating_an_event_emits_event_created() {
    let (db, _temp_dir) = setup().await;
    let (server, mut rx) = test_server(&db);

    let response = server
        .post("/events")
        .json(&EventBody {
            title: "PythonMeetup",
            description: "Осенний митап",
            date: "2026-09-01T18:00:00Z",
        })
        .await;

    assert_eq!(response.status_code(), 201);
    let event: Event = response.json();
    assert_eq!(event.title, "PythonMeetup");
    assert!(event.is_active);
    assert_eq!(event.date, "2026-09-01T18:00:00Z");

    assert_eq!(
        rx.try_recv().ok(),
        Some(ProgramEvent::EventCreated { event_id: event.id })
    );
}

#[tokio::test]
async fn event_with_bad_date_or_title_is_rejected() {
    let (db, _temp_dir) = setup().await;
    let (server, mut rx) = test_server(&db);

    let response = server
        .post("/events")
        .json(&EventBody {
            title: "PythonMeetup",
            description: "",
            date: "завтра",
        })
        .await;
    assert_eq!(response.status_code(), 400);

    let response = server
        .post("/events")
        .json(&EventBody {
            title: "   ",
            description: "",
            date: "2026-09-01T18:00:00Z",
        })
        .await;
    assert_eq!(response.status_code(), 400);

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn announcing_a_change_emits_program_changed() {
    let (db, _temp_dir) = setup().await;
    let event = seed_event(&db, "PythonMeetup", 60).await;
    let (server, mut rx) = test_server(&db);

    #[derive(Serialize)]
    struct ChangeBody<'a> {
        description: &'a str,
    }

    let response = server
        .post(&format!("/events/{}/changes", event.id))
        .json(&ChangeBody {
            description: "Доклад перенесён на 20:00",
        })
        .await;
    assert_eq!(response.status_code(), 202);

    assert_eq!(
        rx.try_recv().ok(),
        Some(ProgramEvent::ProgramChanged {
            event_id: event.id,
            description: "Доклад перенесён на 20:00".to_string(),
        })
    );

    let response = server
        .post("/events/999/changes")
        .json(&ChangeBody {
            description: "ничего",
        })
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn speech_window_is_validated() {
    let (db, _temp_dir) = setup().await;
    let event = seed_event(&db, "PythonMeetup", 60).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    let (server, mut rx) = test_server(&db);

    // start >= end is rejected before anything is written.
    let response = server
        .post("/speeches")
        .json(&SpeechBody {
            event_id: event.id,
            speaker_id: speaker.id,
            title: "Доклад",
            start_time: "2026-09-01T19:00:00Z",
            end_time: "2026-09-01T18:00:00Z",
        })
        .await;
    assert_eq!(response.status_code(), 400);
    assert!(rx.try_recv().is_err());

    let response = server
        .post("/speeches")
        .json(&SpeechBody {
            event_id: event.id,
            speaker_id: speaker.id,
            title: "Доклад",
            start_time: "2026-09-01T18:00:00Z",
            end_time: "2026-09-01T19:00:00Z",
        })
        .await;
    assert_eq!(response.status_code(), 201);

    let speech: Speech = response.json();
    assert_eq!(speech.event_id, event.id);
    match rx.try_recv() {
        Ok(ProgramEvent::ProgramChanged { event_id, description }) => {
            assert_eq!(event_id, event.id);
            assert!(description.contains("Доклад"));
        }
        other => panic!("expected ProgramChanged, got {:?}", other),
    }
}

#[tokio::test]
async fn speech_for_unknown_event_or_speaker_is_not_created() {
    let (db, _temp_dir) = setup().await;
    let event = seed_event(&db, "PythonMeetup", 60).await;
    let (server, mut rx) = test_server(&db);

    let response = server
        .post("/speeches")
        .json(&SpeechBody {
            event_id: 999,
            speaker_id: 1,
            title: "Доклад",
            start_time: "2026-09-01T18:00:00Z",
            end_time: "2026-09-01T19:00:00Z",
        })
        .await;
    assert_eq!(response.status_code(), 404);

    let response = server
        .post("/speeches")
        .json(&SpeechBody {
            event_id: event.id,
            speaker_id: 999,
            title: "Доклад",
            start_time: "2026-09-01T18:00:00Z",
            end_time: "2026-09-01T19:00:00Z",
        })
        .await;
    assert_eq!(response.status_code(), 404);

    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn deleting_a_speech_announces_the_removal() {
    let (db, _temp_dir) = setup().await;
    let event = seed_event(&db, "PythonMeetup", 60).await;
    let speaker = seed_speaker(&db, "Спикер", None).await;
    let speech = common::seed_speech(&db, &event, &speaker, "Введение в asyncio", 30, 90).await;
    let (server, mut rx) = test_server(&db);

    let response = server.delete(&format!("/speeches/{}", speech.id)).await;
    assert_eq!(response.status_code(), 200);

    assert!(Speech::find_by_id(&db.pool, speech.id)
        .await
        .unwrap()
        .is_none());

    match rx.try_recv() {
        Ok(ProgramEvent::ProgramChanged { event_id, description }) => {
            assert_eq!(event_id, event.id);
            assert!(description.contains("Введение в asyncio"));
            assert!(description.contains("удалено"));
        }
        other => panic!("expected ProgramChanged, got {:?}", other),
    }

    let response = server.delete(&format!("/speeches/{}", speech.id)).await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn creating_a_speaker_returns_the_row() {
    let (db, _temp_dir) = setup().await;
    let (server, _rx) = test_server(&db);

    #[derive(Serialize)]
    struct SpeakerBody<'a> {
        name: &'a str,
        telegram_id: Option<i64>,
    }

    let response = server
        .post("/speakers")
        .json(&SpeakerBody {
            name: "Анна Спикер",
            telegram_id: Some(777),
        })
        .await;
    assert_eq!(response.status_code(), 201);

    let speaker: meetup_companion_bot::database::models::Speaker = response.json();
    assert_eq!(speaker.name, "Анна Спикер");
    assert_eq!(speaker.telegram_id, Some(777));
}
