use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::info;

use crate::flows::session::ProfileForm;
use crate::flows::UserIdentity;

/// One networking match as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub full_name: String,
    pub username: Option<String>,
    pub role: String,
    pub experience: String,
    pub looking_for: String,
}

/// Matchmaking backend seam. The flow only ever talks to this trait, so the
/// stub below can be swapped for a real service without touching flow logic.
/// `exclude` carries the indices the user has already seen; server-side
/// exclusion is the eventual owner of that bookkeeping.
#[async_trait]
pub trait CandidateProvider: Send + Sync {
    async fn save_profile(&self, user: &UserIdentity, form: &ProfileForm) -> Result<()>;

    async fn next_candidate(
        &self,
        telegram_id: i64,
        exclude: &HashSet<usize>,
    ) -> Result<Option<(usize, Candidate)>>;
}

/// Temporary in-memory stand-in for the matchmaking backend: a fixed
/// candidate list and a log of saved profiles.
pub struct StubCandidateProvider {
    candidates: Vec<Candidate>,
    profiles: Mutex<HashMap<i64, ProfileForm>>,
}

impl StubCandidateProvider {
    pub fn new() -> Self {
        Self::with_candidates(vec![
            Candidate {
                full_name: "Аня".to_string(),
                username: Some("anya_dev".to_string()),
                role: "Python backend".to_string(),
                experience: "2 года".to_string(),
                looking_for: "других backend-разработчиков и тимлидов".to_string(),
            },
            Candidate {
                full_name: "Илья".to_string(),
                username: Some("ilya_data".to_string()),
                role: "Data engineer".to_string(),
                experience: "3 года".to_string(),
                looking_for: "data-людей и ML-разработчиков".to_string(),
            },
        ])
    }

    pub fn with_candidates(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Test hook: the profile last saved for a user, if any.
    pub async fn saved_profile(&self, telegram_id: i64) -> Option<ProfileForm> {
        self.profiles.lock().await.get(&telegram_id).cloned()
    }
}

impl Default for StubCandidateProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CandidateProvider for StubCandidateProvider {
    async fn save_profile(&self, user: &UserIdentity, form: &ProfileForm) -> Result<()> {
        info!(
            "Networking profile from {} (@{}): {} / {} / {}",
            user.telegram_id,
            user.username.as_deref().unwrap_or("-"),
            form.role,
            form.experience,
            form.looking_for
        );
        self.profiles
            .lock()
            .await
            .insert(user.telegram_id, form.clone());
        Ok(())
    }

    async fn next_candidate(
        &self,
        _telegram_id: i64,
        exclude: &HashSet<usize>,
    ) -> Result<Option<(usize, Candidate)>> {
        let next = self
            .candidates
            .iter()
            .enumerate()
            .find(|(idx, _)| !exclude.contains(idx))
            .map(|(idx, candidate)| (idx, candidate.clone()));
        Ok(next)
    }
}
