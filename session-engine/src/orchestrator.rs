//! The turn-processing pipeline: quality gate, repetition check, correction
//! resolution, reply generation with bounded regeneration, correction
//! registration, persistence, and memory compaction.
//!
//! This is the only component with cross-cutting knowledge of the others.
//! Session state is locked for the whole turn, so turns within one session
//! are sequential while different sessions proceed in parallel.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::timeout;
use tracing::{info, instrument, warn};
use tutor_core::{EngineError, Language, Result, Turn, TutorError};

use llm_client::LlmClient;
use storage::TurnRepository;

use crate::correction::{CorrectionTracker, PracticeOutcome};
use crate::dedup::ReplyDeduplicator;
use crate::lang;
use crate::memory::{ConversationMemory, LlmSummaryGenerator, SummaryGenerator};
use crate::repetition::{RepetitionDetector, RepetitionKind};
use crate::session::{SessionState, SessionStore};
use crate::variety::ResponseVarietyPicker;

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline for one reply-generation call.
    pub generation_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            generation_timeout: Duration::from_secs(25),
        }
    }
}

/// Result of one processed turn: the two turns appended to history, plus
/// classification signals for the transport layer.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub user_turn: Turn,
    pub assistant_turn: Turn,
    /// Set when the turn was classified as a repeat.
    pub repetition: Option<RepetitionKind>,
    /// True when the reply is a fallback after a provider failure.
    pub degraded: bool,
}

/// Composes the engine components into the per-turn pipeline and owns
/// per-session lifecycle. The store is passed in explicitly; there is no
/// ambient global state.
pub struct SessionOrchestrator {
    store: SessionStore,
    repo: Arc<dyn TurnRepository>,
    llm: Arc<dyn LlmClient>,
    summarizer: Arc<dyn SummaryGenerator>,
    detector: RepetitionDetector,
    corrections: CorrectionTracker,
    variety: ResponseVarietyPicker,
    memory: ConversationMemory,
    dedup: ReplyDeduplicator,
    config: EngineConfig,
}

impl SessionOrchestrator {
    /// Builds an orchestrator whose summarizer reuses the generation
    /// provider.
    pub fn new(repo: Arc<dyn TurnRepository>, llm: Arc<dyn LlmClient>) -> Self {
        let summarizer = Arc::new(LlmSummaryGenerator::new(llm.clone()));
        Self::with_summarizer(repo, llm, summarizer)
    }

    pub fn with_summarizer(
        repo: Arc<dyn TurnRepository>,
        llm: Arc<dyn LlmClient>,
        summarizer: Arc<dyn SummaryGenerator>,
    ) -> Self {
        Self {
            store: SessionStore::new(),
            repo,
            llm,
            summarizer,
            detector: RepetitionDetector::default(),
            corrections: CorrectionTracker::new(),
            variety: ResponseVarietyPicker::default(),
            memory: ConversationMemory::default(),
            dedup: ReplyDeduplicator::default(),
            config: EngineConfig::default(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Processes one user turn for a session and returns the appended
    /// (user, assistant) turn pair.
    #[instrument(skip(self, raw_input))]
    pub async fn process_turn(
        &self,
        session_id: &str,
        raw_input: &str,
        language: Language,
    ) -> Result<TurnOutcome> {
        let input = raw_input.trim();
        if input.chars().count() < 2 {
            return Err(EngineError::EmptyInput.into());
        }

        let session = self.store.get_or_create(session_id).await;
        let mut state = session.lock().await;

        info!(session_id, "step: turn received");

        let full_history = self
            .repo
            .load_history(session_id)
            .await
            .map_err(|e| TutorError::Storage(e.to_string()))?;

        // The window and summary are derived caches over the repository;
        // rebuild them when this process sees the session for the first time.
        if state.window.is_empty() && state.compacted == 0 && !full_history.is_empty() {
            self.memory
                .update(&mut state, &full_history, self.summarizer.as_ref(), language)
                .await;
        }

        let poor_quality = self.detector.classifier().is_poor_quality(input);
        let check = self.detector.detect(&state, input);
        info!(
            session_id,
            poor_quality,
            is_repetition = check.is_repetition,
            kind = ?check.kind,
            "step: turn classified"
        );

        let reply_text: String;
        let mut generated = false;

        if let Some(kind) = check.kind {
            reply_text = match kind {
                RepetitionKind::Practice => {
                    match self.corrections.resolve_practice(&mut state, input) {
                        PracticeOutcome::Success { corrected } => {
                            info!(session_id, "step: practice succeeded");
                            lang::practice_success_message(language, &corrected)
                        }
                        PracticeOutcome::Retry { corrected } => {
                            info!(session_id, "step: practice missed, keeping correction");
                            lang::practice_retry_message(language, &corrected)
                        }
                        PracticeOutcome::NoPending => {
                            lang::clarification_message(language).to_string()
                        }
                    }
                }
                kind => self.variety.pick(&mut state, kind, language),
            };
        } else if poor_quality {
            info!(session_id, "step: poor-quality transcript, asking to repeat");
            reply_text = lang::clarification_message(language).to_string();
        } else {
            match self
                .generate_reply(&state, input, language, &full_history)
                .await
            {
                Ok(text) => {
                    generated = true;
                    reply_text = text;
                }
                Err(e) => {
                    // Provider failure: append a fallback pair, mutate no
                    // other session state for this turn.
                    warn!(session_id, error = %e, "step: generation failed, using fallback");
                    let user_turn = Turn::user(input);
                    let assistant_turn = Turn::assistant(lang::fallback_message(language));
                    self.persist_pair(session_id, &user_turn, &assistant_turn)
                        .await?;
                    return Ok(TurnOutcome {
                        user_turn,
                        assistant_turn,
                        repetition: None,
                        degraded: true,
                    });
                }
            }
        }

        if generated {
            self.corrections
                .detect_and_register(&mut state, input, &reply_text, language);
        }

        // Detection ran against history as it stood before this turn; only
        // now does the input enter the ring buffer.
        state.push_recent_input(input);

        let user_turn = Turn::user(input);
        let assistant_turn = Turn::assistant(reply_text);
        self.persist_pair(session_id, &user_turn, &assistant_turn)
            .await?;

        let mut updated_history = full_history;
        updated_history.push(user_turn.clone());
        updated_history.push(assistant_turn.clone());
        self.memory
            .update(
                &mut state,
                &updated_history,
                self.summarizer.as_ref(),
                language,
            )
            .await;

        info!(session_id, "step: turn finished");

        Ok(TurnOutcome {
            user_turn,
            assistant_turn,
            repetition: check.kind,
            degraded: false,
        })
    }

    /// Assembles deduplicated context and calls the generation provider,
    /// retrying exactly once with an anti-repetition instruction when the
    /// draft repeats a recent reply. The retry result is used unconditionally.
    async fn generate_reply(
        &self,
        state: &SessionState,
        input: &str,
        language: Language,
        full_history: &[Turn],
    ) -> anyhow::Result<String> {
        let context = self.memory.read_for_generation(state);
        let filtered = self.dedup.filter_history_for_prompt(&context);

        let mut messages = prompt::turns_to_messages(&filtered);
        if let Some(pending) = &state.pending_correction {
            messages.push(prompt::ChatMessage::system(prompt::correction_context(
                &pending.original_text,
                &pending.corrected_text,
            )));
        }
        messages.push(prompt::ChatMessage::user(input));

        let draft = timeout(self.config.generation_timeout, self.llm.chat(messages.clone()))
            .await
            .map_err(|_| anyhow::anyhow!("reply generation timed out"))??;

        if !self.dedup.is_immediate_repeat(full_history, &draft) {
            return Ok(draft);
        }

        info!("step: drafted reply repeats a recent one, regenerating once");
        messages.push(prompt::ChatMessage::system(
            prompt::ANTI_REPEAT_INSTRUCTION.to_string(),
        ));
        match timeout(self.config.generation_timeout, self.llm.chat(messages)).await {
            Ok(Ok(second)) => Ok(second),
            Ok(Err(e)) => {
                warn!(error = %e, "regeneration failed, keeping first draft");
                Ok(draft)
            }
            Err(_) => {
                warn!("regeneration timed out, keeping first draft");
                Ok(draft)
            }
        }
    }

    async fn persist_pair(
        &self,
        session_id: &str,
        user_turn: &Turn,
        assistant_turn: &Turn,
    ) -> Result<()> {
        self.repo
            .save_turn(session_id, user_turn)
            .await
            .map_err(|e| TutorError::Storage(e.to_string()))?;
        self.repo
            .save_turn(session_id, assistant_turn)
            .await
            .map_err(|e| TutorError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Drops all engine state and persisted history for a session.
    pub async fn clear_session(&self, session_id: &str) -> Result<()> {
        self.store.remove(session_id).await;
        self.repo
            .clear_session(session_id)
            .await
            .map_err(|e| TutorError::Storage(e.to_string()))?;
        info!(session_id, "session cleared");
        Ok(())
    }

    /// Number of sessions with live engine state.
    pub async fn active_sessions(&self) -> usize {
        self.store.len().await
    }

    /// Handle to a session's engine state. Public for integration tests in
    /// `tests/`.
    pub async fn session_state(
        &self,
        session_id: &str,
    ) -> Arc<tokio::sync::Mutex<SessionState>> {
        self.store.get_or_create(session_id).await
    }
}
