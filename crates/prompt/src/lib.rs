//! # Prompt
//!
//! Formats engine state into messages and instruction blocks for the
//! reply-generation and summarization providers.
//!
//! ## Pieces
//!
//! - [`ChatMessage`] / [`MessageRole`]: one-to-one with OpenAI Chat
//!   Completions `messages` entries.
//! - [`turns_to_messages`]: converts persisted turns into chat messages.
//! - [`wrap_summary`]: the synthetic-turn wrapper for an accumulated
//!   session summary.
//! - [`summarization_request`]: the fixed summarization-style prompt sent
//!   to the same generation provider that drafts replies.
//! - [`correction_context`]: context block describing an outstanding
//!   correction awaiting the user's practice attempt.
//! - [`ANTI_REPEAT_INSTRUCTION`]: appended on the single regeneration
//!   attempt after an immediate-repeat reply.

use tutor_core::{Language, Turn, TurnRole};

/// Role of a message, one-to-one with OpenAI Chat Completions API `role` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    /// System instruction (API `role: "system"`).
    System,
    /// User message (API `role: "user"`).
    User,
    /// Assistant message (API `role: "assistant"`).
    Assistant,
}

/// A single chat message, one-to-one with one element of OpenAI `messages` array.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Default system instruction for the tutor persona.
pub const DEFAULT_SYSTEM_MESSAGE: &str = "You are a friendly, patient language tutor. \
Keep replies short and conversational, gently correct mistakes, and ask follow-up \
questions that keep the learner talking. Output plain text only.";

/// Instruction appended when a drafted reply repeated a recent one and a
/// single regeneration is requested.
pub const ANTI_REPEAT_INSTRUCTION: &str = "Your previous draft repeated something you \
already said in this conversation. Write a completely different reply: new wording, \
a new angle, and no phrases reused from your recent messages.";

/// Converts one persisted turn into a chat message.
pub fn turn_to_message(turn: &Turn) -> ChatMessage {
    match turn.role {
        TurnRole::User => ChatMessage::user(turn.content.clone()),
        TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
    }
}

/// Converts a turn list into chat messages, preserving order.
pub fn turns_to_messages(turns: &[Turn]) -> Vec<ChatMessage> {
    turns.iter().map(turn_to_message).collect()
}

/// Wraps an accumulated session summary for injection as a synthetic leading
/// assistant turn.
pub fn wrap_summary(summary: &str) -> String {
    format!("[Previous conversation summary: {}]", summary)
}

/// Renders one turn as a `Role: content` line for summarization input.
pub fn format_turn_line(turn: &Turn) -> String {
    let role = match turn.role {
        TurnRole::User => "User",
        TurnRole::Assistant => "Assistant",
    };
    format!("{}: {}", role, turn.content)
}

/// Builds the fixed summarization request over a batch of turns evicted from
/// the memory window. The summary language is pinned so successive batches
/// accumulate consistently.
pub fn summarization_request(turns: &[Turn], language: Language) -> String {
    let mut out = String::from(
        "Summarize the following tutoring conversation excerpt in 2-4 sentences. \
Keep concrete facts the tutor may need later: the learner's name, interests, \
recurring mistakes, and vocabulary that was practiced. ",
    );
    out.push_str(&format!(
        "Write the summary in {}.\n\n",
        language_name(language)
    ));
    for turn in turns {
        out.push_str(&format_turn_line(turn));
        out.push('\n');
    }
    out
}

/// Context block handed to the generation provider when a correction is
/// outstanding, so the drafted reply does not contradict the pending drill.
pub fn correction_context(original: &str, corrected: &str) -> String {
    format!(
        "Earlier you corrected the learner: they said \"{}\" and you offered \"{}\". \
They have not repeated the corrected form yet. Do not re-correct the same mistake; \
continue the conversation naturally.",
        original, corrected
    )
}

/// English name of a language, used inside provider instructions.
pub fn language_name(language: Language) -> &'static str {
    match language {
        Language::English => "English",
        Language::Spanish => "Spanish",
        Language::Italian => "Italian",
        Language::French => "French",
        Language::German => "German",
        Language::Portuguese => "Portuguese",
    }
}
