//! In-process session store.
//!
//! Constructed once at startup and injected into the engine. Distinct
//! session ids never contend with each other; each session sits behind its
//! own async mutex so the engine can serialize exchanges per session while
//! the map itself stays lock-free for unrelated keys.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use crate::advisor::session::Session;

pub type SharedSession = Arc<Mutex<Session>>;

/// Concurrent map of live sessions with a capacity bound. When full, the
/// least-recently-active session is evicted — the same terminal transition
/// as an explicit clear.
pub struct SessionStore {
    sessions: DashMap<Uuid, SharedSession>,
    max_sessions: usize,
}

impl SessionStore {
    pub fn new(max_sessions: usize) -> Self {
        Self {
            sessions: DashMap::new(),
            max_sessions: max_sessions.max(1),
        }
    }

    /// Inserts a freshly created session, evicting the least-recently-active
    /// one first if the store is at capacity.
    pub async fn insert(&self, session: Session) -> SharedSession {
        if self.sessions.len() >= self.max_sessions {
            self.evict_least_recent().await;
        }
        let id = session.session_id;
        let shared = Arc::new(Mutex::new(session));
        self.sessions.insert(id, Arc::clone(&shared));
        shared
    }

    /// Returns the session handle without holding any map lock afterwards,
    /// so callers can await on the per-session mutex freely.
    pub fn get(&self, session_id: &Uuid) -> Option<SharedSession> {
        self.sessions.get(session_id).map(|s| Arc::clone(&s))
    }

    pub fn contains(&self, session_id: &Uuid) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Idempotent removal; clearing an absent session is not an error.
    pub fn remove(&self, session_id: &Uuid) -> bool {
        self.sessions.remove(session_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    async fn evict_least_recent(&self) {
        // Snapshot ids first; locking entries while iterating the map would
        // hold a shard lock across an await.
        let candidates: Vec<(Uuid, SharedSession)> = self
            .sessions
            .iter()
            .map(|e| (*e.key(), Arc::clone(e.value())))
            .collect();

        let mut oldest: Option<(Uuid, chrono::DateTime<chrono::Utc>)> = None;
        for (id, shared) in candidates {
            let last_activity = shared.lock().await.last_activity;
            match oldest {
                Some((_, ts)) if ts <= last_activity => {}
                _ => oldest = Some((id, last_activity)),
            }
        }

        if let Some((id, _)) = oldest {
            self.sessions.remove(&id);
            info!("Session store at capacity; evicted least-recent session {id}");
        }
    }
}
