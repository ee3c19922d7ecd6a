//! Per-session state and the session store.
//!
//! Each session owns exactly one instance of: the recent-input ring buffer,
//! the used-response-pattern sets, the pending correction slot, the bounded
//! turn window, and the accumulated summary. No cross-session sharing.
//!
//! The store hands out `Arc<Mutex<SessionState>>`; holding the mutex for the
//! whole turn gives each session a single in-flight turn while different
//! sessions proceed in parallel.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::info;
use tutor_core::{SessionId, Turn};

use crate::correction::PendingCorrection;
use crate::repetition::RepetitionKind;

/// How many raw user inputs are kept for exact-repeat detection.
pub const RECENT_INPUT_WINDOW_SIZE: usize = 3;

/// All engine-side state for one session. Derived caches (`window`,
/// `summary` offsets) are rebuilt from the turn repository when missing; the
/// rest lives only here.
#[derive(Debug, Default)]
pub struct SessionState {
    /// Last raw user inputs, oldest first (FIFO, size 3).
    pub recent_inputs: VecDeque<String>,
    /// Canned phrases already emitted, per repetition category.
    pub used_patterns: HashMap<RepetitionKind, HashSet<String>>,
    /// At most one outstanding correction; newer detections overwrite.
    pub pending_correction: Option<PendingCorrection>,
    /// Most recent turns kept verbatim for reply generation.
    pub window: Vec<Turn>,
    /// Accumulated lossy summary of evicted turns. Append-only until clear.
    pub summary: String,
    /// How many persisted turns have already been folded into `summary` and
    /// dropped from the window; summarized turns are never re-read verbatim.
    pub compacted: usize,
}

impl SessionState {
    /// Pushes a raw input onto the ring buffer, evicting the oldest entry on
    /// overflow. Callers run repetition detection *before* this.
    pub fn push_recent_input(&mut self, input: &str) {
        if self.recent_inputs.len() == RECENT_INPUT_WINDOW_SIZE {
            self.recent_inputs.pop_front();
        }
        self.recent_inputs.push_back(input.to_string());
    }

    /// Most recent raw user input, if any.
    pub fn last_input(&self) -> Option<&String> {
        self.recent_inputs.back()
    }
}

/// Process-wide session store: init on first access, teardown on explicit
/// clear. Passed explicitly to the orchestrator; no ambient globals.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Mutex<SessionState>>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the session's state, creating it on first access.
    pub async fn get_or_create(&self, session_id: &str) -> Arc<Mutex<SessionState>> {
        {
            let sessions = self.sessions.read().await;
            if let Some(state) = sessions.get(session_id) {
                return state.clone();
            }
        }
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_insert_with(|| {
                info!(session_id, "creating session state");
                Arc::new(Mutex::new(SessionState::default()))
            })
            .clone()
    }

    /// Drops all state for a session. Returns true if it existed.
    pub async fn remove(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        let existed = sessions.remove(session_id).is_some();
        if existed {
            info!(session_id, "dropped session state");
        }
        existed
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
