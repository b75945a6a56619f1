//! Per-session state.
//!
//! Every handler receives the session it acts on through `SessionStore::acquire`.
//! The returned guard serializes actions within one session; separate sessions
//! never share state.

pub mod handlers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::identity::Identity;
use crate::interview::machine::InterviewSession;

/// Everything remembered for one user between requests.
#[derive(Debug)]
pub struct SessionContext {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    /// Last successful career-path suggestion. Failed completions are never stored.
    pub last_career_path: Option<String>,
    pub last_roadmap: Option<String>,
    pub interview: InterviewSession,
    pub identity: Option<Identity>,
}

impl SessionContext {
    fn new(id: Uuid, interview_max_questions: Option<u32>) -> Self {
        let now = Utc::now();
        Self {
            id,
            created_at: now,
            last_active: now,
            last_career_path: None,
            last_roadmap: None,
            interview: InterviewSession::new(interview_max_questions),
            identity: None,
        }
    }

    fn idle_for(&self, now: DateTime<Utc>) -> Duration {
        (now - self.last_active).to_std().unwrap_or_default()
    }
}

pub type SessionGuard = OwnedMutexGuard<SessionContext>;

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Arc<Mutex<SessionContext>>>>>,
    interview_max_questions: Option<u32>,
}

impl SessionStore {
    /// `interview_max_questions` of 0 disables the question cap.
    pub fn new(interview_max_questions: u32) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            interview_max_questions: (interview_max_questions > 0).then_some(interview_max_questions),
        }
    }

    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let context = SessionContext::new(id, self.interview_max_questions);
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(context)));
        info!("Session {} created", id);
        id
    }

    /// Locks the session for the duration of one action and marks it active.
    /// The map lock is released before waiting on the session lock.
    pub async fn acquire(&self, id: Uuid) -> Result<SessionGuard, AppError> {
        let session = self
            .sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))?;

        let mut guard = session.lock_owned().await;
        guard.last_active = Utc::now();
        Ok(guard)
    }

    /// Tears a session down. Returns false if it did not exist.
    pub async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!("Session {} removed", id);
        }
        removed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops sessions idle longer than `ttl`. Sessions busy with an action are kept.
    pub async fn prune_idle(&self, ttl: Duration) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| match session.try_lock() {
            Ok(context) => context.idle_for(now) <= ttl,
            Err(_) => true,
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!("Pruned {} idle sessions ({} remain)", pruned, sessions.len());
        }
        pruned
    }
}

/// Periodically prunes idle sessions for the life of the process.
pub fn spawn_sweeper(store: SessionStore, ttl: Duration, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let pruned = store.prune_idle(ttl).await;
            debug!(
                "Session sweep finished: {} pruned, {} active",
                pruned,
                store.len().await
            );
        }
    })
}
