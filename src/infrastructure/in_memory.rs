use crate::domain::ports::{SessionStore, SharedClock};
use crate::domain::session::Session;
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Clone)]
struct Entry {
    session: Session,
    touched: DateTime<Utc>,
}

#[derive(Clone)]
struct Expiry {
    idle_ttl: TimeDelta,
    clock: SharedClock,
}

/// A thread-safe in-memory session store.
///
/// Uses `Arc<RwLock<HashMap<String, _>>>` so clones share the same map.
/// Without an idle TTL, sessions live as long as the process.
#[derive(Default, Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
    expiry: Option<Expiry>,
}

impl InMemorySessionStore {
    /// Creates a store that never expires sessions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that forgets sessions not written for `idle_ttl`.
    pub fn with_idle_ttl(idle_ttl: TimeDelta, clock: SharedClock) -> Self {
        Self {
            sessions: Arc::default(),
            expiry: Some(Expiry { idle_ttl, clock }),
        }
    }

    fn is_stale(&self, entry: &Entry, now: Option<DateTime<Utc>>) -> bool {
        match (&self.expiry, now) {
            (Some(expiry), Some(now)) => now - entry.touched > expiry.idle_ttl,
            _ => false,
        }
    }

    fn now(&self) -> Option<DateTime<Utc>> {
        self.expiry.as_ref().map(|expiry| expiry.clock.now())
    }

    /// Drops every idle session and returns how many were removed.
    pub async fn evict_idle(&self) -> usize {
        let now = self.now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_stale(entry, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "evicted idle sessions");
        }
        evicted
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> Result<Option<Session>> {
        let now = self.now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(user_id) {
                None => return Ok(None),
                Some(entry) if !self.is_stale(entry, now) => return Ok(Some(entry.session.clone())),
                Some(_) => {}
            }
        }
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get(user_id)
            && self.is_stale(entry, now)
        {
            debug!(user = user_id, "session expired");
            sessions.remove(user_id);
        }
        Ok(None)
    }

    async fn put(&self, session: Session) -> Result<()> {
        let touched = self.now().unwrap_or_else(Utc::now);
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.user_id.clone(), Entry { session, touched });
        Ok(())
    }
}
