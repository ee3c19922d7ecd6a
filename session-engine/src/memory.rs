//! Bounded conversation memory with summarization overflow.
//!
//! The memory window keeps the most recent turns verbatim; older turns are
//! folded into an accumulating summary by an external summarization call and
//! are never re-read verbatim afterwards. Summarization failure is
//! best-effort: the overflow is still dropped so the window never grows
//! unbounded.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, warn};
use tutor_core::{Language, Turn, TurnRole};

use crate::session::SessionState;

/// Maximum turns kept verbatim per session.
pub const MEMORY_WINDOW_SIZE: usize = 30;

/// Summarization collaborator seam. Stateless from the engine's point of
/// view: receives a snapshot of overflowed turns, returns summary text.
#[async_trait]
pub trait SummaryGenerator: Send + Sync {
    async fn summarize(&self, turns: &[Turn], language: Language) -> anyhow::Result<String>;
}

/// Summarizer backed by the same generation provider that drafts replies,
/// with a fixed summarization-style prompt and pinned language.
pub struct LlmSummaryGenerator {
    llm: Arc<dyn llm_client::LlmClient>,
    deadline: std::time::Duration,
}

impl LlmSummaryGenerator {
    pub fn new(llm: Arc<dyn llm_client::LlmClient>) -> Self {
        Self {
            llm,
            deadline: std::time::Duration::from_secs(25),
        }
    }

    pub fn with_deadline(mut self, deadline: std::time::Duration) -> Self {
        self.deadline = deadline;
        self
    }
}

#[async_trait]
impl SummaryGenerator for LlmSummaryGenerator {
    async fn summarize(&self, turns: &[Turn], language: Language) -> anyhow::Result<String> {
        let request = prompt::summarization_request(turns, language);
        let messages = vec![prompt::ChatMessage::user(request)];
        match timeout(self.deadline, self.llm.chat(messages)).await {
            Ok(result) => result,
            Err(_) => anyhow::bail!("summarization timed out"),
        }
    }
}

/// Owns the window/summary maintenance for session state.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    window_size: usize,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self {
            window_size: MEMORY_WINDOW_SIZE,
        }
    }
}

impl ConversationMemory {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    /// Syncs the session's window to the most recent turns of the full
    /// persisted history, summarizing turns that fall off the window.
    ///
    /// `state.compacted` tracks how much of the history was already folded
    /// into the summary, so a turn is summarized at most once. On
    /// summarization failure the batch is dropped without a summary; the
    /// window is truncated either way.
    pub async fn update(
        &self,
        state: &mut SessionState,
        full_history: &[Turn],
        summarizer: &dyn SummaryGenerator,
        language: Language,
    ) {
        let total = full_history.len();
        if total > self.window_size && total - self.window_size > state.compacted {
            let overflow = &full_history[state.compacted..total - self.window_size];
            debug!(count = overflow.len(), "folding overflow turns into summary");
            match summarizer.summarize(overflow, language).await {
                Ok(text) if !text.trim().is_empty() => {
                    if !state.summary.is_empty() {
                        state.summary.push_str("\n\n");
                    }
                    state.summary.push_str(text.trim());
                }
                Ok(_) => warn!("summarizer returned empty text; batch dropped unsummarized"),
                Err(e) => {
                    warn!(error = %e, "summarization failed; batch dropped unsummarized")
                }
            }
            state.compacted = total - self.window_size;
        }

        // `compacted` can exceed `total` only if the repo was cleared behind
        // our back; clamp instead of panicking on the slice.
        let start = total
            .saturating_sub(self.window_size)
            .max(state.compacted)
            .min(total);
        state.window = full_history[start..].to_vec();
    }

    /// Returns what reply generation sees: the window, with a synthetic
    /// leading assistant turn wrapping the summary when one exists. Never
    /// the unbounded full history.
    pub fn read_for_generation(&self, state: &SessionState) -> Vec<Turn> {
        let mut turns = Vec::with_capacity(state.window.len() + 1);
        if !state.summary.is_empty() {
            let oldest = state
                .window
                .first()
                .map(|t| t.timestamp)
                .unwrap_or_else(Utc::now)
                - Duration::seconds(1);
            turns.push(Turn::with_timestamp(
                TurnRole::Assistant,
                prompt::wrap_summary(&state.summary),
                oldest,
            ));
        }
        turns.extend(state.window.iter().cloned());
        turns
    }
}
