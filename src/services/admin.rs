use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::{delete, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::database::connection::DatabaseManager;
use crate::database::models::{Event, Speaker, Speech};
use crate::services::events::{ProgramEvent, ProgramEventSender};
use crate::utils::datetime::{parse_rfc3339, to_rfc3339};
use crate::utils::validation::{validate_speech_window, validate_title};

/// Mutation surface for program data. Every write that changes what
/// participants see emits a `ProgramEvent` instead of calling the
/// notification dispatcher directly.
#[derive(Clone)]
pub struct AdminState {
    pub db: DatabaseManager,
    pub events: ProgramEventSender,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn not_found(message: impl Into<String>) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

fn internal_error(context: &str, e: impl std::fmt::Display) -> ApiError {
    error!("{}: {}", context, e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: context.to_string(),
        }),
    )
}

pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/events", post(create_event))
        .route("/events/:id/changes", post(announce_program_change))
        .route("/speakers", post(create_speaker))
        .route("/speeches", post(create_speech))
        .route("/speeches/:id", delete(delete_speech))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

async fn create_event(
    State(state): State<AdminState>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    validate_title(&payload.title).map_err(|e| bad_request(e.to_string()))?;
    let date = parse_rfc3339(&payload.date).map_err(|e| bad_request(e.to_string()))?;

    let event = Event::create(
        &state.db.pool,
        payload.title.trim(),
        &payload.description,
        &to_rfc3339(&date),
        payload.is_active,
    )
    .await
    .map_err(|e| internal_error("Failed to create event", e))?;

    info!("Event '{}' created (id {})", event.title, event.id);
    let _ = state.events.send(ProgramEvent::EventCreated { event_id: event.id });

    Ok((StatusCode::CREATED, Json(event)))
}

#[derive(Debug, Deserialize)]
pub struct ProgramChangeRequest {
    pub description: String,
}

async fn announce_program_change(
    State(state): State<AdminState>,
    Path(event_id): Path<i64>,
    Json(payload): Json<ProgramChangeRequest>,
) -> Result<StatusCode, ApiError> {
    if payload.description.trim().is_empty() {
        return Err(bad_request("Change description cannot be empty"));
    }

    let event = Event::find_by_id(&state.db.pool, event_id)
        .await
        .map_err(|e| internal_error("Failed to look up event", e))?
        .ok_or_else(|| not_found("Event not found"))?;

    let _ = state.events.send(ProgramEvent::ProgramChanged {
        event_id: event.id,
        description: payload.description.trim().to_string(),
    });

    Ok(StatusCode::ACCEPTED)
}

#[derive(Debug, Deserialize)]
pub struct CreateSpeakerRequest {
    pub name: String,
    pub telegram_id: Option<i64>,
}

async fn create_speaker(
    State(state): State<AdminState>,
    Json(payload): Json<CreateSpeakerRequest>,
) -> Result<(StatusCode, Json<Speaker>), ApiError> {
    validate_title(&payload.name).map_err(|e| bad_request(e.to_string()))?;

    let speaker = Speaker::create(&state.db.pool, payload.name.trim(), payload.telegram_id)
        .await
        .map_err(|e| internal_error("Failed to create speaker", e))?;

    Ok((StatusCode::CREATED, Json(speaker)))
}

#[derive(Debug, Deserialize)]
pub struct CreateSpeechRequest {
    pub event_id: i64,
    pub speaker_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

async fn create_speech(
    State(state): State<AdminState>,
    Json(payload): Json<CreateSpeechRequest>,
) -> Result<(StatusCode, Json<Speech>), ApiError> {
    validate_title(&payload.title).map_err(|e| bad_request(e.to_string()))?;
    let (start, end) = validate_speech_window(&payload.start_time, &payload.end_time)
        .map_err(|e| bad_request(e.to_string()))?;

    let event = Event::find_by_id(&state.db.pool, payload.event_id)
        .await
        .map_err(|e| internal_error("Failed to look up event", e))?
        .ok_or_else(|| not_found("Event not found"))?;

    Speaker::find_by_id(&state.db.pool, payload.speaker_id)
        .await
        .map_err(|e| internal_error("Failed to look up speaker", e))?
        .ok_or_else(|| not_found("Speaker not found"))?;

    let speech = Speech::create(
        &state.db.pool,
        event.id,
        payload.speaker_id,
        payload.title.trim(),
        &payload.description,
        &to_rfc3339(&start),
        &to_rfc3339(&end),
        payload.is_active,
    )
    .await
    .map_err(|e| internal_error("Failed to create speech", e))?;

    info!("Speech '{}' added to event '{}'", speech.title, event.title);
    let _ = state.events.send(ProgramEvent::ProgramChanged {
        event_id: event.id,
        description: format!("В программу добавлено выступление «{}»", speech.title),
    });

    Ok((StatusCode::CREATED, Json(speech)))
}

async fn delete_speech(
    State(state): State<AdminState>,
    Path(speech_id): Path<i64>,
) -> Result<Json<Speech>, ApiError> {
    let speech = Speech::delete(&state.db.pool, speech_id)
        .await
        .map_err(|e| internal_error("Failed to delete speech", e))?
        .ok_or_else(|| not_found("Speech not found"))?;

    info!("Speech '{}' deleted from program", speech.title);
    let _ = state.events.send(ProgramEvent::ProgramChanged {
        event_id: speech.event_id,
        description: format!("Выступление «{}» было удалено из программы", speech.title),
    });

    Ok(Json(speech))
}
