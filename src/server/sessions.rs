//! Live selection sessions keyed by id. Idle sessions are swept on access.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::rally::SelectionSession;

#[derive(Debug)]
pub struct SessionEntry {
    pub session: SelectionSession,
    pub created_at: DateTime<Utc>,
    last_active: Instant,
}

#[derive(Debug)]
pub struct SessionRegistry {
    sessions: HashMap<Uuid, SessionEntry>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_timeout,
        }
    }

    pub fn create(&mut self, session: SelectionSession) -> Uuid {
        let id = Uuid::new_v4();
        self.sessions.insert(
            id,
            SessionEntry {
                session,
                created_at: Utc::now(),
                last_active: Instant::now(),
            },
        );
        log::info!("session {id} created ({} live)", self.sessions.len());
        id
    }

    /// Looks up a session and marks it active.
    pub fn get_mut(&mut self, id: &Uuid) -> Option<&mut SessionEntry> {
        let entry = self.sessions.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(entry)
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<SessionEntry> {
        let removed = self.sessions.remove(id);
        if removed.is_some() {
            log::info!("session {id} removed");
        }
        removed
    }

    /// Drops sessions idle longer than the timeout as of `now`.
    pub fn sweep_expired(&mut self, now: Instant) -> usize {
        let timeout = self.idle_timeout;
        let before = self.sessions.len();
        self.sessions.retain(|id, entry| {
            let keep = now.saturating_duration_since(entry.last_active) <= timeout;
            if !keep {
                log::debug!("session {id} expired");
            }
            keep
        });
        let swept = before - self.sessions.len();
        if swept > 0 {
            log::info!("expired {swept} idle session(s)");
        }
        swept
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
