//! Turn repository trait: the persistence collaborator the engine talks to.

use async_trait::async_trait;
use tutor_core::Turn;

use crate::error::StorageError;

/// Per-session turn persistence. Load order is insertion order; the engine
/// relies on it and never reorders or deduplicates on read.
#[async_trait]
pub trait TurnRepository: Send + Sync {
    /// Appends one turn to a session's history.
    async fn save_turn(&self, session_id: &str, turn: &Turn) -> Result<(), StorageError>;

    /// Returns a session's full history in insertion order. Empty for an
    /// unknown session.
    async fn load_history(&self, session_id: &str) -> Result<Vec<Turn>, StorageError>;

    /// Deletes all turns for a session. Succeeds silently if none exist.
    async fn clear_session(&self, session_id: &str) -> Result<(), StorageError>;
}
