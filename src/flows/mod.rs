//! Conversational flows: one free-text message stream multiplexed across
//! mutually exclusive multi-step dialogues (question, networking, donation).

pub mod candidates;
pub mod donation;
pub mod networking;
pub mod question;
pub mod session;

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::database::connection::DatabaseManager;
use crate::flows::candidates::CandidateProvider;
use crate::flows::session::SessionStore;
use crate::services::outbox::Outbox;

/// Stable identity of the person behind an incoming message.
#[derive(Debug, Clone)]
pub struct UserIdentity {
    pub telegram_id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl UserIdentity {
    pub fn from_telegram(user: &teloxide::types::User) -> Self {
        Self {
            telegram_id: user.id.0 as i64,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }

    pub fn full_name(&self) -> String {
        match &self.last_name {
            Some(last) => format!("{} {}", self.first_name, last),
            None => self.first_name.clone(),
        }
    }
}

/// Routes an inbound text message to at most one active flow, in fixed
/// priority order: question > networking > donation. Holds the per-user
/// session lock for the whole handling, which serializes concurrent messages
/// from the same user.
pub struct FlowEngine {
    db: DatabaseManager,
    sessions: SessionStore,
    candidates: Arc<dyn CandidateProvider>,
    outbox: Arc<dyn Outbox>,
}

impl FlowEngine {
    pub fn new(
        db: DatabaseManager,
        sessions: SessionStore,
        candidates: Arc<dyn CandidateProvider>,
        outbox: Arc<dyn Outbox>,
    ) -> Self {
        Self {
            db,
            sessions,
            candidates,
            outbox,
        }
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    pub(crate) fn outbox(&self) -> &dyn Outbox {
        self.outbox.as_ref()
    }

    pub(crate) fn candidates(&self) -> &dyn CandidateProvider {
        self.candidates.as_ref()
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Returns `true` when some flow claimed the message; `false` hands the
    /// text back to the menu router.
    pub async fn dispatch(&self, user: &UserIdentity, text: &str) -> anyhow::Result<bool> {
        let mut session = self.sessions.lock(user.telegram_id).await;

        if question::handle_if_waiting(self, &mut session, user, text).await? {
            return Ok(true);
        }
        if networking::handle_if_active(self, &mut session, user, text).await? {
            return Ok(true);
        }
        if donation::handle_if_active(self, &mut session, user, text).await? {
            return Ok(true);
        }

        Ok(false)
    }

    pub async fn start_question(&self, user: &UserIdentity) -> anyhow::Result<()> {
        let mut session = self.sessions.lock(user.telegram_id).await;
        question::start(self, &mut session, user).await
    }

    pub async fn start_networking(&self, user: &UserIdentity) -> anyhow::Result<()> {
        let mut session = self.sessions.lock(user.telegram_id).await;
        networking::start(self, &mut session, user).await
    }

    pub async fn start_donation(&self, user: &UserIdentity) -> anyhow::Result<()> {
        let mut session = self.sessions.lock(user.telegram_id).await;
        donation::start(self, &mut session, user).await
    }
}
