//! In-memory implementation of [`TurnRepository`] for tests and development.
//!
//! Uses `Arc<RwLock<HashMap>>` for thread-safe concurrent access; data is
//! lost on restart.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tutor_core::Turn;

use crate::error::StorageError;
use crate::repository::TurnRepository;

/// In-memory turn store keyed by session.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTurnRepository {
    sessions: Arc<RwLock<HashMap<String, Vec<Turn>>>>,
}

impl InMemoryTurnRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of turns stored for a session.
    pub async fn len(&self, session_id: &str) -> usize {
        let sessions = self.sessions.read().await;
        sessions.get(session_id).map(Vec::len).unwrap_or(0)
    }

    pub async fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id).await == 0
    }
}

#[async_trait]
impl TurnRepository for InMemoryTurnRepository {
    async fn save_turn(&self, session_id: &str, turn: &Turn) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(session_id.to_string())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn load_history(&self, session_id: &str) -> Result<Vec<Turn>, StorageError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned().unwrap_or_default())
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), StorageError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }
}
