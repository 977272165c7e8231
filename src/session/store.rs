use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use super::{SessionId, Turn};

/// Shared handle to one session's ordered turns.
pub type SessionHistory = Arc<Mutex<Vec<Turn>>>;

/// Registry of conversation histories keyed by [`SessionId`].
///
/// The map lock only guards structural changes (lookup and insertion).
/// History content sits behind a per-session mutex, so jobs appending to
/// different sessions never wait on each other. Sessions are never removed:
/// a reset abandons its old identifier and the history stays reachable by it.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHistory>>,
    next_id: AtomicU64,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out a fresh identifier that has never been returned before.
    pub fn allocate(&self) -> SessionId {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Return the history for `id`, registering an empty one on first access.
    pub fn get_or_create(&self, id: SessionId) -> SessionHistory {
        {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(history) = sessions.get(&id) {
                return Arc::clone(history);
            }
        }

        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(sessions.entry(id).or_default())
    }

    /// Snapshot of the turns recorded under `id`, if that session exists.
    pub fn history(&self, id: SessionId) -> Option<Vec<Turn>> {
        let history = {
            let sessions = self.sessions.read().unwrap_or_else(PoisonError::into_inner);
            sessions.get(&id).cloned()
        }?;
        let turns = history.lock().unwrap_or_else(PoisonError::into_inner);
        Some(turns.clone())
    }

    /// Number of sessions ever materialized.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no session has been materialized yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
