//! Bounded store of code tables for the session-keyed framing.
//!
//! A table is registered under a caller-chosen session id when text is
//! hidden and looked up by the same id when it is revealed. The store is an
//! explicit object shared by reference (or `Arc`), never a global.
//!
//! Memory is bounded two ways:
//! - at most `max_entries` tables; inserting beyond that evicts the least
//!   recently used one;
//! - optionally, entries older than `ttl` count as missing and are purged.
//!
//! With no TTL configured the clock is never read, so the store also works
//! on targets without `std::time::Instant`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, StegoError};
use crate::huffman::CodeTable;

/// Default cap on stored tables.
pub const DEFAULT_MAX_ENTRIES: usize = 1024;

/// Limits applied by a [`SessionStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of stored tables (at least 1).
    pub max_entries: usize,
    /// Lifetime of an entry in seconds; `None` keeps entries until evicted.
    pub ttl_secs: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl_secs: None,
        }
    }
}

impl SessionConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug)]
struct Entry {
    table: Arc<CodeTable>,
    created: Option<Instant>,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Inner {
    entries: HashMap<String, Entry>,
    tick: u64,
}

impl Inner {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }
}

/// Thread-safe, bounded map from session id to code table.
#[derive(Debug)]
pub struct SessionStore {
    inner: Mutex<Inner>,
    max_entries: usize,
    ttl: Option<Duration>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl SessionStore {
    /// Create an empty store. A `max_entries` of zero is treated as one.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            max_entries: config.max_entries.max(1),
            ttl: config.ttl(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // A panic while holding the lock cannot leave the map half-updated,
        // so a poisoned lock is still usable.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn is_expired(&self, entry: &Entry, now: Option<Instant>) -> bool {
        match (self.ttl, entry.created, now) {
            (Some(ttl), Some(created), Some(now)) => now.duration_since(created) >= ttl,
            _ => false,
        }
    }

    fn now(&self) -> Option<Instant> {
        self.ttl.map(|_| Instant::now())
    }

    /// Register `table` under `session_id`, replacing any previous entry.
    ///
    /// Evicts the least recently used entry when the store is full.
    pub fn insert(&self, session_id: impl Into<String>, table: CodeTable) {
        let session_id = session_id.into();
        let now = self.now();
        let mut inner = self.lock();

        if !inner.entries.contains_key(&session_id) && inner.entries.len() >= self.max_entries {
            let oldest = inner
                .entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                warn!(session = %id, "session store full, evicting least recently used entry");
                inner.entries.remove(&id);
            }
        }

        let last_used = inner.next_tick();
        inner.entries.insert(
            session_id,
            Entry {
                table: Arc::new(table),
                created: now,
                last_used,
            },
        );
        debug!(entries = inner.entries.len(), "session registered");
    }

    /// Look up the table for `session_id`, refreshing its recency.
    ///
    /// # Errors
    ///
    /// Returns `StegoError::MissingSession` if the id was never registered,
    /// was evicted, or has expired.
    pub fn get(&self, session_id: &str) -> Result<Arc<CodeTable>> {
        let now = self.now();
        let mut inner = self.lock();

        let expired = match inner.entries.get(session_id) {
            Some(entry) => self.is_expired(entry, now),
            None => {
                warn!(session = %session_id, "unknown session");
                return Err(StegoError::MissingSession(session_id.to_string()));
            }
        };
        if expired {
            inner.entries.remove(session_id);
            warn!(session = %session_id, "session expired");
            return Err(StegoError::MissingSession(session_id.to_string()));
        }

        let tick = inner.next_tick();
        match inner.entries.get_mut(session_id) {
            Some(entry) => {
                entry.last_used = tick;
                Ok(Arc::clone(&entry.table))
            }
            None => Err(StegoError::MissingSession(session_id.to_string())),
        }
    }

    /// Remove and return the table for `session_id`, if present.
    pub fn remove(&self, session_id: &str) -> Option<Arc<CodeTable>> {
        self.lock().entries.remove(session_id).map(|e| e.table)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let Some(now) = self.now() else {
            return 0;
        };
        let mut inner = self.lock();
        let before = inner.entries.len();
        inner
            .entries
            .retain(|_, entry| !self.is_expired(entry, Some(now)));
        before - inner.entries.len()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
