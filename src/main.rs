//! # Meetup Companion Bot Main Entry Point
//!
//! Initializes logging, loads configuration, sets up the database, wires the
//! flow engine and the notification dispatcher together, starts the reminder
//! sweep and the admin/health HTTP server, and runs the Telegram bot.

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod bot;
mod config;
mod database;
mod flows;
mod services;
mod utils;

use crate::bot::handlers::BotHandler;
use crate::config::Config;
use crate::database::connection::DatabaseManager;
use crate::flows::candidates::StubCandidateProvider;
use crate::flows::session::SessionStore;
use crate::flows::FlowEngine;
use crate::services::notifier::NotificationService;
use crate::services::outbox::{Outbox, TelegramOutbox};
use crate::services::reminder::ReminderService;
use crate::services::{admin, events, health};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "meetup_companion_bot=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    info!("Starting Meetup Companion Bot v{}", env!("CARGO_PKG_VERSION"));
    info!(
        "Configuration loaded - Database: {}, HTTP Port: {}",
        config.database_url, config.http_port
    );

    info!("Initializing database connection...");
    let db = DatabaseManager::new(&config.database_url).await?;
    db.run_migrations().await?;
    let db_arc = Arc::new(db.clone());
    info!("Database initialized successfully");

    info!("Initializing Telegram bot...");
    let bot = Bot::new(&config.telegram_bot_token);
    let outbox: Arc<dyn Outbox> = Arc::new(TelegramOutbox::new(bot.clone()));

    let sessions = SessionStore::new();
    let candidates = Arc::new(StubCandidateProvider::new());
    let engine = Arc::new(FlowEngine::new(
        db.clone(),
        sessions,
        candidates,
        outbox.clone(),
    ));
    let handler = BotHandler::new(db.clone(), engine, outbox.clone());
    info!("Telegram bot initialized successfully");

    // Program change events flow through a channel into the dispatcher task;
    // emitters never talk to Telegram themselves.
    let (event_tx, event_rx) = events::channel();
    let dispatcher_task = NotificationService::new(db.clone(), outbox.clone()).spawn(event_rx);

    info!("Initializing reminder service...");
    let mut reminder_service = match ReminderService::new(
        db_arc.clone(),
        event_tx.clone(),
        config.reminder_lead_minutes,
    )
    .await
    {
        Ok(service) => service,
        Err(e) => {
            tracing::error!("Failed to create reminder service: {}", e);
            return Err(anyhow::anyhow!("Failed to create reminder service: {}", e));
        }
    };

    if let Err(e) = reminder_service.start().await {
        tracing::error!("Failed to start reminder service: {}", e);
    }

    let router = health::router(db_arc.clone())
        .nest(
            "/admin",
            admin::router(admin::AdminState {
                db: db.clone(),
                events: event_tx,
            }),
        )
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(10)));

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.http_port))
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to port {}: {}", config.http_port, e))?;
    info!("Admin/health server starting on port {}", config.http_port);

    let bot_task = tokio::spawn(async move {
        Dispatcher::builder(bot, handler.schema())
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;
    });

    let http_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!("HTTP server error: {}", e);
        }
    });

    tokio::select! {
        result = bot_task => {
            if let Err(e) = result {
                tracing::error!("Bot task error: {}", e);
            }
        }
        result = http_task => {
            if let Err(e) = result {
                tracing::error!("HTTP task error: {}", e);
            }
        }
    }

    if let Err(e) = reminder_service.stop().await {
        tracing::warn!("Error stopping reminder service: {}", e);
    }
    dispatcher_task.abort();

    info!("Application stopped");
    Ok(())
}
