//! Correction tracking: pattern-based detection of tutor-issued corrections
//! in replies, and resolution of the user's practice attempts.
//!
//! Detection is a declarative table of `(language, pattern)` rules evaluated
//! in order (extraction is always capture group 1), plus a couple of
//! contextual preposition rules that fire even without a phrase match. No
//! NLP anywhere.

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use tutor_core::Language;

use crate::normalize::normalize;
use crate::repetition::PRACTICE_THRESHOLD;
use crate::session::SessionState;
use crate::similarity::similarity;

/// A tutor-issued corrected phrase awaiting the user's practice attempt.
/// At most one per session; newer detections silently replace older ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingCorrection {
    pub original_text: String,
    pub corrected_text: String,
    pub created_at: DateTime<Utc>,
}

/// One row of the correction-phrase table.
struct CorrectionRule {
    language: Language,
    pattern: Regex,
}

impl CorrectionRule {
    fn new(language: Language, pattern: &str) -> Self {
        Self {
            language,
            // Table patterns are fixed at compile time; a bad one is a bug
            // in this file, not a runtime condition.
            pattern: Regex::new(pattern).expect("invalid correction pattern"),
        }
    }
}

/// Phrase patterns per language, evaluated in order; group 1 is the
/// corrected text. The character class stops at quotes and sentence
/// punctuation so the extracted phrase stays clean.
static CORRECTION_RULES: Lazy<Vec<CorrectionRule>> = Lazy::new(|| {
    use Language::*;
    vec![
        CorrectionRule::new(English, r#"(?i)you could say[,:]?\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(English, r#"(?i)it should be\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(English, r#"(?i)we say\s*[“"']?([^“”"',.!?\n]+)[”"']?,?\s+not\b"#),
        CorrectionRule::new(English, r#"(?i)the correct (?:way|form|phrase) is\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(English, r#"(?i)try saying\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(Spanish, r#"(?i)podrías decir[,:]?\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(Spanish, r#"(?i)se dice\s*[“"']?([^“”"',.!?\n]+)[”"']?,?\s+no\b"#),
        CorrectionRule::new(Spanish, r#"(?i)la forma correcta es\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(Italian, r#"(?i)potresti dire[,:]?\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(Italian, r#"(?i)si dice\s*[“"']?([^“”"',.!?\n]+)[”"']?,?\s+non\b"#),
        CorrectionRule::new(Italian, r#"(?i)la forma corretta è\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(French, r#"(?i)tu pourrais dire[,:]?\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(French, r#"(?i)on dit\s*[“"']?([^“”"',.!?\n]+)[”"']?,?\s+pas\b"#),
        CorrectionRule::new(French, r#"(?i)la forme correcte est\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(German, r#"(?i)du könntest sagen[,:]?\s*[„“"']?([^„“”"'.!?\n]+)"#),
        CorrectionRule::new(German, r#"(?i)man sagt\s*[„“"']?([^„“”"',.!?\n]+)[“”"']?,?\s+nicht\b"#),
        CorrectionRule::new(German, r#"(?i)richtig ist\s*[„“"']?([^„“”"'.!?\n]+)"#),
        CorrectionRule::new(Portuguese, r#"(?i)você poderia dizer[,:]?\s*[“"']?([^“”"'.!?\n]+)"#),
        CorrectionRule::new(Portuguese, r#"(?i)dizemos\s*[“"']?([^“”"',.!?\n]+)[”"']?,?\s+não\b"#),
        CorrectionRule::new(Portuguese, r#"(?i)a forma correta é\s*[“"']?([^“”"'.!?\n]+)"#),
    ]
});

/// Known-wrong phrase → corrected phrase pairs; fire when the user said the
/// wrong form and the reply contains the right one, even without a generic
/// pattern match.
const CONTEXTUAL_RULES: &[(&str, &str)] = &[
    ("married with", "married to"),
    ("depends of", "depends on"),
    ("listen music", "listen to music"),
    ("pay from the nose", "pay through the nose"),
    ("arrive to home", "arrive home"),
];

/// Outcome of resolving a practice attempt against the pending correction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PracticeOutcome {
    /// Attempt matched; the pending correction is cleared.
    Success { corrected: String },
    /// Attempt missed; the pending correction is kept and the user retries.
    Retry { corrected: String },
    /// Nothing was pending.
    NoPending,
}

/// Detects corrections in accepted replies and resolves practice attempts.
#[derive(Debug, Clone, Default)]
pub struct CorrectionTracker;

impl CorrectionTracker {
    pub fn new() -> Self {
        Self
    }

    /// Scans the accepted reply for a correction and registers it as the
    /// session's pending correction, overwriting any previous one.
    pub fn detect_and_register(
        &self,
        state: &mut SessionState,
        user_input: &str,
        tutor_reply: &str,
        language: Language,
    ) {
        if let Some(corrected) = self.extract(tutor_reply, user_input, language) {
            info!(corrected = %corrected, "registering pending correction");
            state.pending_correction = Some(PendingCorrection {
                original_text: user_input.to_string(),
                corrected_text: corrected,
                created_at: Utc::now(),
            });
        }
    }

    /// First match wins: language-specific phrase patterns in table order,
    /// then the contextual preposition rules.
    fn extract(&self, tutor_reply: &str, user_input: &str, language: Language) -> Option<String> {
        for rule in CORRECTION_RULES.iter().filter(|r| r.language == language) {
            if let Some(captures) = rule.pattern.captures(tutor_reply) {
                if let Some(m) = captures.get(1) {
                    let text = m.as_str().trim();
                    if !text.is_empty() {
                        debug!(pattern = %rule.pattern, "correction phrase matched");
                        return Some(text.to_string());
                    }
                }
            }
        }

        let user_norm = normalize(user_input);
        let reply_norm = normalize(tutor_reply);
        for (wrong, right) in CONTEXTUAL_RULES {
            if user_norm.contains(wrong) && reply_norm.contains(right) {
                debug!(wrong, right, "contextual correction rule matched");
                return Some((*right).to_string());
            }
        }

        None
    }

    /// Resolves a practice attempt. Success clears the pending correction;
    /// a miss keeps it so the user can retry the same corrected text.
    pub fn resolve_practice(&self, state: &mut SessionState, input: &str) -> PracticeOutcome {
        let pending = match &state.pending_correction {
            Some(pending) => pending,
            None => return PracticeOutcome::NoPending,
        };

        let corrected = pending.corrected_text.clone();
        if similarity(input, &corrected) > PRACTICE_THRESHOLD {
            state.pending_correction = None;
            PracticeOutcome::Success { corrected }
        } else {
            PracticeOutcome::Retry { corrected }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> CorrectionTracker {
        CorrectionTracker::new()
    }

    #[test]
    fn you_could_say_registers_pending() {
        let mut state = SessionState::default();
        tracker().detect_and_register(
            &mut state,
            "I paid from the nose",
            "Almost! You could say \"pay through the nose\" instead.",
            Language::English,
        );

        let pending = state.pending_correction.expect("correction registered");
        assert_eq!(pending.corrected_text, "pay through the nose");
        assert_eq!(pending.original_text, "I paid from the nose");
    }

    #[test]
    fn we_say_x_not_y_extracts_first_form() {
        let mut state = SessionState::default();
        tracker().detect_and_register(
            &mut state,
            "I am agree",
            "We say I agree, not I am agree.",
            Language::English,
        );

        assert_eq!(
            state.pending_correction.unwrap().corrected_text,
            "I agree"
        );
    }

    #[test]
    fn spanish_pattern_matches_in_spanish_sessions_only() {
        let mut state = SessionState::default();
        tracker().detect_and_register(
            &mut state,
            "yo soy frío",
            "Casi. Podrías decir \"tengo frío\".",
            Language::English,
        );
        assert!(state.pending_correction.is_none());

        tracker().detect_and_register(
            &mut state,
            "yo soy frío",
            "Casi. Podrías decir \"tengo frío\".",
            Language::Spanish,
        );
        assert_eq!(state.pending_correction.unwrap().corrected_text, "tengo frío");
    }

    #[test]
    fn contextual_rule_fires_without_phrase_pattern() {
        let mut state = SessionState::default();
        tracker().detect_and_register(
            &mut state,
            "She is married with a doctor",
            "Oh nice! In English she is married to a doctor. What does he do?",
            Language::English,
        );

        assert_eq!(state.pending_correction.unwrap().corrected_text, "married to");
    }

    #[test]
    fn plain_reply_registers_nothing() {
        let mut state = SessionState::default();
        tracker().detect_and_register(
            &mut state,
            "I like pizza",
            "Pizza is great! What toppings do you like?",
            Language::English,
        );

        assert!(state.pending_correction.is_none());
    }

    #[test]
    fn newer_detection_overwrites_older() {
        let mut state = SessionState::default();
        let t = tracker();
        t.detect_and_register(
            &mut state,
            "first",
            "You could say \"first form\".",
            Language::English,
        );
        t.detect_and_register(
            &mut state,
            "second",
            "You could say \"second form\".",
            Language::English,
        );

        assert_eq!(state.pending_correction.unwrap().corrected_text, "second form");
    }

    #[test]
    fn practice_exact_match_succeeds_and_clears() {
        let mut state = SessionState::default();
        state.pending_correction = Some(PendingCorrection {
            original_text: "from the nose".to_string(),
            corrected_text: "through the nose".to_string(),
            created_at: Utc::now(),
        });

        let outcome = tracker().resolve_practice(&mut state, "through the nose");
        assert_eq!(
            outcome,
            PracticeOutcome::Success {
                corrected: "through the nose".to_string()
            }
        );
        assert!(state.pending_correction.is_none());
    }

    #[test]
    fn practice_miss_keeps_pending() {
        let mut state = SessionState::default();
        state.pending_correction = Some(PendingCorrection {
            original_text: "from the nose".to_string(),
            corrected_text: "through the nose".to_string(),
            created_at: Utc::now(),
        });

        let outcome = tracker().resolve_practice(&mut state, "from the nose");
        assert_eq!(
            outcome,
            PracticeOutcome::Retry {
                corrected: "through the nose".to_string()
            }
        );
        assert!(state.pending_correction.is_some());
    }

    #[test]
    fn resolve_with_nothing_pending() {
        let mut state = SessionState::default();
        assert_eq!(
            tracker().resolve_practice(&mut state, "anything"),
            PracticeOutcome::NoPending
        );
    }
}
