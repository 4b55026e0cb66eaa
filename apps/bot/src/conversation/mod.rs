//! Conversational state: which input each user is expected to send next.
//!
//! Sessions are in-memory only. Losing them on restart is acceptable —
//! the durable part of a user is their profile row, and `/start`
//! rebuilds the session from it.

pub mod engine;
pub mod messages;

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

pub use engine::Engine;

/// Which input the conversation currently expects from a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    AwaitingName,
    AwaitingGender,
    AwaitingStack,
    ReadyForVacancy,
    ChoosingUpdateTarget,
}

/// Per-user conversation session.
#[derive(Debug, Clone)]
pub struct Session {
    /// `None` until the user has started a conversation.
    pub state: Option<ChatState>,
    /// True only while the "replace all fields" sequence runs; cleared
    /// once its stack step completes.
    pub updating_all: bool,
    touched: Instant,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: None,
            updating_all: false,
            touched: Instant::now(),
        }
    }
}

/// Sessions idle longer than this are dropped the next time the store
/// is touched.
const SESSION_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// In-memory session store keyed by user id.
#[derive(Default)]
pub struct SessionStore {
    inner: Mutex<HashMap<i64, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the user's session, or a fresh default one if
    /// none exists. Does not create an entry.
    pub fn snapshot(&self, user_id: i64) -> Session {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        prune(&mut sessions, SESSION_IDLE_TTL);
        sessions.get(&user_id).cloned().unwrap_or_default()
    }

    pub fn set_state(&self, user_id: i64, state: Option<ChatState>) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        prune(&mut sessions, SESSION_IDLE_TTL);
        let session = sessions.entry(user_id).or_default();
        session.state = state;
        session.touched = Instant::now();
    }

    pub fn set_updating_all(&self, user_id: i64, updating_all: bool) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        let session = sessions.entry(user_id).or_default();
        session.updating_all = updating_all;
        session.touched = Instant::now();
    }

    #[cfg(test)]
    fn prune_idle(&self, ttl: Duration) {
        let mut sessions = self.inner.lock().expect("session store poisoned");
        prune(&mut sessions, ttl);
    }
}

fn prune(sessions: &mut HashMap<i64, Session>, ttl: Duration) {
    sessions.retain(|_, s| s.touched.elapsed() < ttl);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_of_unknown_user_is_default() {
        let store = SessionStore::new();
        let session = store.snapshot(1);
        assert_eq!(session.state, None);
        assert!(!session.updating_all);
    }

    #[test]
    fn test_state_roundtrip() {
        let store = SessionStore::new();
        store.set_state(1, Some(ChatState::AwaitingName));
        assert_eq!(store.snapshot(1).state, Some(ChatState::AwaitingName));
        // Other users are unaffected.
        assert_eq!(store.snapshot(2).state, None);
    }

    #[test]
    fn test_updating_all_flag_is_independent_of_state() {
        let store = SessionStore::new();
        store.set_updating_all(1, true);
        store.set_state(1, Some(ChatState::AwaitingGender));
        let session = store.snapshot(1);
        assert!(session.updating_all);
        assert_eq!(session.state, Some(ChatState::AwaitingGender));
    }

    #[test]
    fn test_idle_sessions_are_pruned() {
        let store = SessionStore::new();
        store.set_state(1, Some(ChatState::ReadyForVacancy));
        store.prune_idle(Duration::ZERO);
        assert_eq!(store.snapshot(1).state, None);
    }
}
