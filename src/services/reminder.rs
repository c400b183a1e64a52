use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::info;

use crate::database::connection::DatabaseManager;
use crate::database::models::{Event, Notification, Speech};
use crate::services::events::{ProgramEvent, ProgramEventSender};
use crate::utils::datetime::{parse_rfc3339, to_rfc3339};

/// Periodic sweep that emits `ReminderDue` events for speeches (and whole
/// events) starting within the configured lead window. Delivery is the
/// dispatcher's job; this service only decides *what* is due.
pub struct ReminderService {
    db: Arc<DatabaseManager>,
    events: ProgramEventSender,
    scheduler: JobScheduler,
    lead_minutes: i64,
}

impl ReminderService {
    pub async fn new(
        db: Arc<DatabaseManager>,
        events: ProgramEventSender,
        lead_minutes: i64,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            db,
            events,
            scheduler,
            lead_minutes,
        })
    }

    pub async fn start(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let db = self.db.clone();
        let events = self.events.clone();
        let lead_minutes = self.lead_minutes;

        // Every 5 minutes; the lead window is wider, duplicates are filtered
        // against already-created reminder notifications.
        let sweep_job = Job::new_async("0 */5 * * * *", move |_uuid, _l| {
            let db = db.clone();
            let events = events.clone();
            Box::pin(async move {
                if let Err(e) = sweep_due_reminders(&db, &events, lead_minutes).await {
                    tracing::error!("Reminder sweep failed: {}", e);
                }
            })
        })?;

        self.scheduler.add(sweep_job).await?;
        self.scheduler.start().await?;

        info!(
            "Reminder service started - sweeping every 5 minutes, lead window {} minutes",
            self.lead_minutes
        );
        Ok(())
    }

    pub async fn stop(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.scheduler.shutdown().await?;
        Ok(())
    }

    // Manual trigger for testing
    pub async fn sweep_now(&self) -> anyhow::Result<()> {
        sweep_due_reminders(&self.db, &self.events, self.lead_minutes).await
    }
}

async fn sweep_due_reminders(
    db: &DatabaseManager,
    events: &ProgramEventSender,
    lead_minutes: i64,
) -> anyhow::Result<()> {
    let now = Utc::now();
    let from = to_rfc3339(&now);
    let until = to_rfc3339(&(now + Duration::minutes(lead_minutes)));

    for event in Event::find_all_active(&db.pool).await? {
        let due_speeches =
            Speech::find_starting_within(&db.pool, event.id, &from, &until).await?;

        for speech in due_speeches {
            if Notification::reminder_exists_for_speech(&db.pool, speech.id).await? {
                continue;
            }
            info!(
                "Speech '{}' starts soon, scheduling reminder",
                speech.title
            );
            let _ = events.send(ProgramEvent::ReminderDue {
                event_id: event.id,
                speech_id: Some(speech.id),
            });
        }

        let event_starts_soon = parse_rfc3339(&event.date)
            .map(|date| date > now && date <= now + Duration::minutes(lead_minutes))
            .unwrap_or(false);
        if event_starts_soon && !Notification::event_reminder_exists(&db.pool, event.id).await? {
            info!("Event '{}' starts soon, scheduling reminder", event.title);
            let _ = events.send(ProgramEvent::ReminderDue {
                event_id: event.id,
                speech_id: None,
            });
        }
    }

    Ok(())
}
