//! Document session store
//!
//! Keeps each uploaded document with its summary, chat history and challenge
//! round in memory. Sessions expire after a period of inactivity and the
//! store holds a bounded number of them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;
use tokio::sync::RwLock;
use tokio::time::interval;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::DocumentConfig;
use crate::models::{ChallengeRound, ChatMessage, Document, DocumentInfo};

/// Everything the assistant remembers about one uploaded document
#[derive(Debug, Clone)]
pub struct DocumentSession {
    pub document: Document,
    pub summary: String,
    pub summary_source: String,
    pub messages: Vec<ChatMessage>,
    pub challenge: Option<ChallengeRound>,
}

impl DocumentSession {
    pub fn new(document: Document, summary: String, summary_source: String) -> Self {
        Self {
            document,
            summary,
            summary_source,
            messages: Vec::new(),
            challenge: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.document.id
    }

    pub fn info(&self) -> DocumentInfo {
        DocumentInfo {
            id: self.document.id,
            name: self.document.name.clone(),
            kind: self.document.kind,
            word_count: self.document.word_count(),
            char_count: self.document.char_count(),
            summary: self.summary.clone(),
            summary_source: self.summary_source.clone(),
            uploaded_at: self.document.uploaded_at,
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    session: DocumentSession,
    last_access: Instant,
}

impl SessionEntry {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.last_access.elapsed() > ttl
    }
}

/// Session store statistics
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub active_sessions: usize,
    pub expired_sessions: usize,
    pub max_sessions: usize,
    pub ttl_secs: u64,
}

/// In-memory, TTL and capacity bounded session map
#[derive(Debug)]
pub struct SessionStore {
    entries: RwLock<HashMap<Uuid, SessionEntry>>,
    max_sessions: usize,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_sessions: usize, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_sessions,
            ttl,
        }
    }

    pub fn from_config(config: &DocumentConfig) -> Self {
        Self::new(
            config.max_sessions,
            Duration::from_secs(config.session_ttl_secs),
        )
    }

    /// Store a session, evicting expired sessions and then the least
    /// recently used one when full
    pub async fn insert(&self, session: DocumentSession) -> Uuid {
        let id = session.id();
        let mut entries = self.entries.write().await;

        if entries.len() >= self.max_sessions {
            self.evict_expired_locked(&mut entries);
        }

        if entries.len() >= self.max_sessions {
            if let Some(oldest) = Self::find_oldest_key(&entries) {
                debug!(session_id = %oldest, "Evicting least recently used session");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            id,
            SessionEntry {
                session,
                last_access: Instant::now(),
            },
        );
        id
    }

    /// Snapshot of a live session. Refreshes its idle timer.
    pub async fn get(&self, id: &Uuid) -> Option<DocumentSession> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(id) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                entry.last_access = Instant::now();
                Some(entry.session.clone())
            }
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// Modify a live session in place. Returns `None` when it does not exist
    /// or has expired.
    pub async fn update<R>(&self, id: &Uuid, f: impl FnOnce(&mut DocumentSession) -> R) -> Option<R> {
        let mut entries = self.entries.write().await;
        match entries.get_mut(id) {
            Some(entry) if !entry.is_expired(self.ttl) => {
                entry.last_access = Instant::now();
                Some(f(&mut entry.session))
            }
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    pub async fn remove(&self, id: &Uuid) -> Option<DocumentSession> {
        let mut entries = self.entries.write().await;
        entries.remove(id).map(|e| e.session)
    }

    /// Drop every expired session, returning how many were removed
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        self.evict_expired_locked(&mut entries)
    }

    fn evict_expired_locked(&self, entries: &mut HashMap<Uuid, SessionEntry>) -> usize {
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(self.ttl));
        before - entries.len()
    }

    fn find_oldest_key(entries: &HashMap<Uuid, SessionEntry>) -> Option<Uuid> {
        entries
            .iter()
            .min_by_key(|(_, entry)| entry.last_access)
            .map(|(k, _)| *k)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    pub async fn stats(&self) -> SessionStats {
        let entries = self.entries.read().await;
        let expired = entries
            .values()
            .filter(|e| e.is_expired(self.ttl))
            .count();

        SessionStats {
            active_sessions: entries.len() - expired,
            expired_sessions: expired,
            max_sessions: self.max_sessions,
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Periodically drop expired sessions
pub fn spawn_session_cleanup(store: Arc<SessionStore>, every: Duration) {
    tokio::spawn(async move {
        let mut interval_timer = interval(every);
        info!(
            "Session cleanup task started (interval: {}s)",
            every.as_secs()
        );

        loop {
            interval_timer.tick().await;
            let evicted = store.evict_expired().await;
            if evicted > 0 {
                info!(evicted = evicted, "Evicted expired document sessions");
            }
        }
    });
}
