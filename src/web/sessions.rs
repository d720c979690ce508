//! Bounded in-memory store of browser sessions.
//!
//! Records expire after a period without use and the store never holds more
//! than its capacity; the least recently used record goes first.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::prompt::ToneSelection;
use crate::session::SessionState;

/// Per-browser record: draft state plus what the form last showed.
#[derive(Debug, Clone, Default)]
pub(super) struct BrowserSession {
    pub(super) state: SessionState,
    pub(super) enquiry: String,
    pub(super) tone: ToneSelection,
}

#[derive(Debug)]
struct Entry {
    session: BrowserSession,
    last_seen: Instant,
}

#[derive(Debug)]
pub(super) struct SessionStore {
    entries: HashMap<Uuid, Entry>,
    ttl: Duration,
    capacity: usize,
}

impl SessionStore {
    /// A capacity of zero is raised to one.
    pub(super) fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.saturating_duration_since(entry.last_seen) < self.ttl
    }

    /// Live record for `id`, refreshing its last-seen time. Expired records
    /// are dropped.
    pub(super) fn get(&mut self, id: &Uuid, now: Instant) -> Option<BrowserSession> {
        let live = self
            .entries
            .get(id)
            .is_some_and(|entry| self.is_live(entry, now));
        if !live {
            self.entries.remove(id);
            return None;
        }
        self.entries.get_mut(id).map(|entry| {
            entry.last_seen = now;
            entry.session.clone()
        })
    }

    /// Store `session` under `id`, sweeping expired records and evicting the
    /// least recently used one when full.
    pub(super) fn insert(&mut self, id: Uuid, session: BrowserSession, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.last_seen) < ttl);

        if !self.entries.contains_key(&id) && self.entries.len() >= self.capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(oldest, _)| *oldest);
            if let Some(oldest) = oldest {
                self.entries.remove(&oldest);
            }
        }

        self.entries.insert(
            id,
            Entry {
                session,
                last_seen: now,
            },
        );
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }
}
