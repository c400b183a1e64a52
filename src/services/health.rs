use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::database::connection::DatabaseManager;

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub database: DatabaseHealth,
    pub uptime_seconds: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DatabaseHealth {
    pub status: String,
    pub connection_pool_size: u32,
    pub response_time_ms: u64,
}

#[derive(Clone)]
struct HealthState {
    db: Arc<DatabaseManager>,
    start_time: DateTime<Utc>,
}

pub fn router(db: Arc<DatabaseManager>) -> Router {
    let state = HealthState {
        db,
        start_time: Utc::now(),
    };

    Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .route("/health/live", get(liveness_check))
        .with_state(state)
}

async fn health_check(
    State(state): State<HealthState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    let start = std::time::Instant::now();
    let db_healthy = ping_database(&state.db).await.is_ok();
    let response_time_ms = start.elapsed().as_millis() as u64;

    let status = if db_healthy { "healthy" } else { "unhealthy" };
    let response = HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            status: status.to_string(),
            connection_pool_size: state.db.pool.size(),
            response_time_ms,
        },
        uptime_seconds: Utc::now()
            .signed_duration_since(state.start_time)
            .num_seconds(),
    };

    if db_healthy {
        Ok(Json(response))
    } else {
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

async fn readiness_check(State(state): State<HealthState>) -> Result<Json<&'static str>, StatusCode> {
    match ping_database(&state.db).await {
        Ok(()) => Ok(Json("ready")),
        Err(_) => Err(StatusCode::SERVICE_UNAVAILABLE),
    }
}

async fn liveness_check() -> Json<&'static str> {
    Json("alive")
}

async fn ping_database(db: &DatabaseManager) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").fetch_one(&db.pool).await?;
    Ok(())
}
