use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Networking questionnaire answers, filled one step at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub role: String,
    pub experience: String,
    pub looking_for: String,
}

impl ProfileForm {
    pub fn set_answer(&mut self, step: usize, answer: &str) {
        let answer = answer.trim();
        match step {
            0 => self.role = answer.to_string(),
            1 => self.experience = answer.to_string(),
            2 => self.looking_for = answer.to_string(),
            _ => {}
        }
    }
}

/// The active conversational flow of one user. At most one flow is active at
/// any time; every transition is a total match over this type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingQuestion {
        speech_id: i64,
    },
    FillingProfile {
        step: usize,
        form: ProfileForm,
    },
    BrowsingCandidates {
        seen: HashSet<usize>,
    },
    AwaitingDonationAmount,
}

/// Ephemeral per-user state. Lost on restart, overwritten on the next flow
/// start, never persisted.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub state: FlowState,
    pub has_profile: bool,
}

/// In-process session registry. Each user gets their own mutex, so two
/// messages from the same user are processed strictly one after another
/// while different users stay fully parallel.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<Mutex<HashMap<i64, Arc<Mutex<Session>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the session of one user, creating a default one on first
    /// contact. The guard must be held for the whole message handling.
    pub async fn lock(&self, telegram_id: i64) -> OwnedMutexGuard<Session> {
        let entry = {
            let mut sessions = self.inner.lock().await;
            sessions.entry(telegram_id).or_default().clone()
        };
        entry.lock_owned().await
    }

    /// Resets a user's session to the default: no active flow, no flow data.
    pub async fn clear(&self, telegram_id: i64) {
        let mut session = self.lock(telegram_id).await;
        *session = Session::default();
    }
}
