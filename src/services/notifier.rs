use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::database::connection::DatabaseManager;
use crate::database::models::{
    Event, Notification, NotificationKind, Participant, Speaker, Speech, Subscription,
    UserNotification,
};
use crate::services::events::{ProgramEvent, ProgramEventReceiver};
use crate::services::outbox::Outbox;
use crate::utils::datetime::{format_date_ru, format_time, parse_rfc3339};

/// Fans one logical notification out to every qualifying recipient. All three
/// operations share the same shape: create the broadcast record, send
/// per-recipient with isolated failure handling, write a receipt for each
/// accepted send, then mark the record sent.
pub struct NotificationService {
    db: DatabaseManager,
    outbox: Arc<dyn Outbox>,
}

impl NotificationService {
    pub fn new(db: DatabaseManager, outbox: Arc<dyn Outbox>) -> Self {
        Self { db, outbox }
    }

    /// Consumes program change events until the channel closes.
    pub fn spawn(self, mut rx: ProgramEventReceiver) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                if let Err(e) = self.dispatch(event).await {
                    error!("Failed to dispatch notification: {}", e);
                }
            }
            info!("Notification dispatcher stopped");
        })
    }

    async fn dispatch(&self, change: ProgramEvent) -> Result<()> {
        match change {
            ProgramEvent::EventCreated { event_id } => {
                let Some(event) = Event::find_by_id(&self.db.pool, event_id).await? else {
                    warn!("EventCreated for unknown event {}", event_id);
                    return Ok(());
                };
                self.notify_new_event(&event).await?;
            }
            ProgramEvent::ProgramChanged {
                event_id,
                description,
            } => {
                let Some(event) = Event::find_by_id(&self.db.pool, event_id).await? else {
                    warn!("ProgramChanged for unknown event {}", event_id);
                    return Ok(());
                };
                self.notify_program_change(&event, &description).await?;
            }
            ProgramEvent::ReminderDue {
                event_id,
                speech_id,
            } => {
                let Some(event) = Event::find_by_id(&self.db.pool, event_id).await? else {
                    warn!("ReminderDue for unknown event {}", event_id);
                    return Ok(());
                };
                let speech = match speech_id {
                    Some(id) => Speech::find_by_id(&self.db.pool, id).await?,
                    None => None,
                };
                self.notify_reminder(&event, speech.as_ref()).await?;
            }
        }
        Ok(())
    }

    /// Program change broadcast to explicitly opted-in subscribers of the
    /// event. Zero subscribers means no Notification record at all.
    pub async fn notify_program_change(&self, event: &Event, description: &str) -> Result<u32> {
        let pool = &self.db.pool;
        let recipients = Subscription::subscribers_for_program_changes(pool, event.id).await?;

        if recipients.is_empty() {
            info!(
                "No subscribers for program changes in event '{}'",
                event.title
            );
            return Ok(0);
        }

        let notification = Notification::create(
            pool,
            event.id,
            None,
            &format!("Изменения в программе {}", event.title),
            description,
            NotificationKind::ProgramChange,
        )
        .await?;

        let text = format!(
            "*Изменения в программе*\n\n*{}*\n\n{}\n\nИспользуй /program чтобы посмотреть актуальное расписание",
            event.title, description
        );

        let mut sent = 0;
        for participant in &recipients {
            match self
                .deliver_markdown(participant, &notification.id, &text)
                .await
            {
                Ok(()) => sent += 1,
                Err(e) => error!(
                    "Failed to send program change to {}: {}",
                    participant.telegram_id, e
                ),
            }
        }

        Notification::mark_sent(pool, &notification.id).await?;
        info!(
            "Sent {} program change notifications for event '{}'",
            sent, event.title
        );
        Ok(sent)
    }

    /// New event broadcast over all known participants. A participant with no
    /// subscription row anywhere is treated as opted in, and sending lazily
    /// creates a subscription for the new event with every toggle on.
    pub async fn notify_new_event(&self, event: &Event) -> Result<u32> {
        let pool = &self.db.pool;
        let participants = Participant::all(pool).await?;

        if participants.is_empty() {
            info!("No participants to notify about event '{}'", event.title);
        }

        let notification = Notification::create(
            pool,
            event.id,
            None,
            &format!("Новое мероприятие: {}", event.title),
            &event.description,
            NotificationKind::NewEvent,
        )
        .await?;

        let date_display = parse_rfc3339(&event.date)
            .map(|dt| format_date_ru(&dt))
            .unwrap_or_else(|_| event.date.clone());
        let text = format!(
            "*Новое мероприятие!*\n\n*{}*\n\n{}\n\nДата: {}\n\nИспользуй /subscribe чтобы подписаться на уведомления об этом мероприятии",
            event.title, event.description, date_display
        );

        let mut sent = 0;
        for participant in &participants {
            match self
                .deliver_new_event(participant, event, &notification, &text)
                .await
            {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => error!(
                    "Failed to send new event notification to {}: {}",
                    participant.telegram_id, e
                ),
            }
        }

        Notification::mark_sent(pool, &notification.id).await?;
        info!(
            "Sent {} new event notifications for event '{}'",
            sent, event.title
        );
        Ok(sent)
    }

    async fn deliver_new_event(
        &self,
        participant: &Participant,
        event: &Event,
        notification: &Notification,
        text: &str,
    ) -> Result<bool> {
        let pool = &self.db.pool;

        let has_any = Subscription::has_any(pool, participant.id).await?;
        let opted_in =
            !has_any || Subscription::has_new_events_enabled(pool, participant.id).await?;
        if !opted_in {
            return Ok(false);
        }

        Subscription::get_or_create(pool, participant.id, event.id).await?;

        self.deliver_markdown(participant, &notification.id, text)
            .await?;
        Ok(true)
    }

    /// Reminder broadcast; wording depends on whether a specific speech is
    /// starting or the event itself.
    pub async fn notify_reminder(&self, event: &Event, speech: Option<&Speech>) -> Result<u32> {
        let pool = &self.db.pool;
        let recipients = Subscription::subscribers_for_reminders(pool, event.id).await?;

        let (title, message) = match speech {
            Some(speech) => {
                let speaker_name = Speaker::find_by_id(pool, speech.speaker_id)
                    .await?
                    .map(|s| s.name)
                    .unwrap_or_else(|| "Спикер".to_string());
                let start_display = parse_rfc3339(&speech.start_time)
                    .map(|dt| format_time(&dt))
                    .unwrap_or_else(|_| speech.start_time.clone());
                (
                    format!("Напоминание: {}", speech.title),
                    format!(
                        "Скоро начнется выступление!\n\n{}\n«{}»\n\nНачало: {}",
                        speaker_name, speech.title, start_display
                    ),
                )
            }
            None => {
                let start_display = parse_rfc3339(&event.date)
                    .map(|dt| format_time(&dt))
                    .unwrap_or_else(|_| event.date.clone());
                (
                    format!("Напоминание: {}", event.title),
                    format!(
                        "Скоро начнется мероприятие!\n\n{}\n\nНачало: {}",
                        event.title, start_display
                    ),
                )
            }
        };

        let notification = Notification::create(
            pool,
            event.id,
            speech.map(|s| s.id),
            &title,
            &message,
            NotificationKind::Reminder,
        )
        .await?;

        let mut sent = 0;
        for participant in &recipients {
            match self
                .deliver_text(participant, &notification.id, &notification.message)
                .await
            {
                Ok(()) => sent += 1,
                Err(e) => error!(
                    "Failed to send reminder to {}: {}",
                    participant.telegram_id, e
                ),
            }
        }

        Notification::mark_sent(pool, &notification.id).await?;
        info!("Sent {} reminder notifications", sent);
        Ok(sent)
    }

    async fn deliver_text(
        &self,
        participant: &Participant,
        notification_id: &str,
        text: &str,
    ) -> Result<()> {
        self.outbox.send_text(participant.telegram_id, text).await?;
        UserNotification::create(&self.db.pool, participant.id, notification_id).await?;
        Ok(())
    }

    async fn deliver_markdown(
        &self,
        participant: &Participant,
        notification_id: &str,
        text: &str,
    ) -> Result<()> {
        self.outbox
            .send_markdown(participant.telegram_id, text)
            .await?;
        UserNotification::create(&self.db.pool, participant.id, notification_id).await?;
        Ok(())
    }
}
