//! Core types: turn, role, language, and session identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque session key. The engine never inspects it; it only keys state by it.
pub type SessionId = String;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnRole {
    User,
    Assistant,
}

/// One utterance in a conversation. Immutable once created; insertion order
/// is the only order that matters downstream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Turn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Creates a turn with a generated UUID and the current timestamp.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }

    /// Creates a turn with an explicit timestamp. Used for synthetic turns
    /// that must sort before real history (e.g. an injected summary).
    pub fn with_timestamp(
        role: TurnRole,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == TurnRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == TurnRole::Assistant
    }
}

/// Tutoring languages the engine localizes for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    Spanish,
    Italian,
    French,
    German,
    Portuguese,
}

impl Language {
    /// ISO 639-1 code, as carried on the transport boundary.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::Spanish => "es",
            Language::Italian => "it",
            Language::French => "fr",
            Language::German => "de",
            Language::Portuguese => "pt",
        }
    }

    /// Parses an ISO 639-1 code; unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_lowercase().as_str() {
            "en" => Some(Language::English),
            "es" => Some(Language::Spanish),
            "it" => Some(Language::Italian),
            "fr" => Some(Language::French),
            "de" => Some(Language::German),
            "pt" => Some(Language::Portuguese),
            _ => None,
        }
    }

    pub fn all() -> [Language; 6] {
        [
            Language::English,
            Language::Spanish,
            Language::Italian,
            Language::French,
            Language::German,
            Language::Portuguese,
        ]
    }
}
