//! Repetition detection: classifies a new user turn as a non-repeat or as a
//! repeat of type error, playful, memorization, or practice.

use serde::{Deserialize, Serialize};

use crate::quality::TranscriptQualityClassifier;
use crate::normalize::normalize;
use crate::session::SessionState;
use crate::similarity::similarity;

/// Why the user repeated themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RepetitionKind {
    /// The same long utterance arrived twice, most likely a client or
    /// transcription glitch.
    Error,
    /// The repeat carries affectionate language; the user is being silly.
    Playful,
    /// A short phrase repeated on purpose to memorize it.
    Memorization,
    /// The user is repeating a correction the tutor issued.
    Practice,
}

/// Detection result: whether the turn is a repeat, and of which kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RepetitionCheck {
    pub is_repetition: bool,
    pub kind: Option<RepetitionKind>,
}

impl RepetitionCheck {
    pub fn none() -> Self {
        Self {
            is_repetition: false,
            kind: None,
        }
    }

    pub fn of(kind: RepetitionKind) -> Self {
        Self {
            is_repetition: true,
            kind: Some(kind),
        }
    }
}

/// Similarity above which an input counts as practicing a pending correction.
pub const PRACTICE_THRESHOLD: f64 = 0.8;

/// Normalized length below which an exact repeat defaults to memorization.
const MEMORIZATION_MAX_LEN: usize = 50;

/// Classifies repeats against the session's recent-input window and pending
/// correction. Pure over explicit state; callers push the input onto the
/// window only *after* this runs.
#[derive(Debug, Clone)]
pub struct RepetitionDetector {
    quality: TranscriptQualityClassifier,
    affectionate_markers: Vec<String>,
    common_phrases: Vec<String>,
}

impl Default for RepetitionDetector {
    fn default() -> Self {
        let affectionate_markers = [
            "love you", "my dear", "sweetheart",
            "te quiero", "te amo", "cariño",
            "ti amo", "amore",
            "je t'aime", "mon amour",
            "ich liebe dich", "schatz",
            "eu te amo", "querida", "querido",
        ];
        let common_phrases = [
            "how are you", "my name is", "nice to meet you", "i don't understand",
            "cómo estás", "me llamo", "mucho gusto", "no entiendo",
            "come stai", "mi chiamo", "piacere", "non capisco",
            "comment ça va", "je m'appelle", "enchanté", "je ne comprends pas",
            "wie geht es dir", "ich heiße", "ich verstehe nicht",
            "como vai", "meu nome é", "não entendo",
        ];
        Self {
            quality: TranscriptQualityClassifier::default(),
            affectionate_markers: affectionate_markers.iter().map(|s| s.to_string()).collect(),
            common_phrases: common_phrases.iter().map(|s| normalize(s)).collect(),
        }
    }
}

impl RepetitionDetector {
    pub fn new(quality: TranscriptQualityClassifier) -> Self {
        Self {
            quality,
            ..Self::default()
        }
    }

    /// The gate this detector consults; the orchestrator shares it for its
    /// own poor-quality short-circuit.
    pub fn classifier(&self) -> &TranscriptQualityClassifier {
        &self.quality
    }

    /// Classifies `input` against state as it stood before this turn.
    ///
    /// Order: quality gate, then pending-correction practice match (takes
    /// priority over everything), then exact normalized match against the
    /// most recent input, then content-based typing of the repeat.
    pub fn detect(&self, state: &SessionState, input: &str) -> RepetitionCheck {
        if self.quality.is_poor_quality(input) {
            return RepetitionCheck::none();
        }

        if let Some(pending) = &state.pending_correction {
            if similarity(input, &pending.corrected_text) > PRACTICE_THRESHOLD {
                return RepetitionCheck::of(RepetitionKind::Practice);
            }
        }

        let last = match state.last_input() {
            Some(last) => last,
            None => return RepetitionCheck::none(),
        };

        let normalized = normalize(input);
        if normalized != normalize(last) {
            return RepetitionCheck::none();
        }

        if self
            .affectionate_markers
            .iter()
            .any(|m| normalized.contains(m.as_str()))
        {
            return RepetitionCheck::of(RepetitionKind::Playful);
        }

        if normalized.chars().count() < MEMORIZATION_MAX_LEN
            || self
                .common_phrases
                .iter()
                .any(|p| normalized.contains(p.as_str()))
        {
            return RepetitionCheck::of(RepetitionKind::Memorization);
        }

        RepetitionCheck::of(RepetitionKind::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::correction::PendingCorrection;
    use chrono::Utc;

    fn state_with_last(input: &str) -> SessionState {
        let mut state = SessionState::default();
        state.push_recent_input(input);
        state
    }

    #[test]
    fn empty_window_is_never_a_repeat() {
        let detector = RepetitionDetector::default();
        let state = SessionState::default();
        assert_eq!(
            detector.detect(&state, "I like pizza"),
            RepetitionCheck::none()
        );
    }

    #[test]
    fn exact_short_repeat_is_memorization() {
        // Seed scenario: trailing punctuation differs, still an exact
        // normalized match; under 50 chars => memorization.
        let detector = RepetitionDetector::default();
        let state = state_with_last("I like pizza");

        let check = detector.detect(&state, "I like pizza.");
        assert!(check.is_repetition);
        assert_eq!(check.kind, Some(RepetitionKind::Memorization));
    }

    #[test]
    fn poor_quality_gate_suppresses_detection() {
        // Seed scenario: "CONVERSATION" twice is a garbage transcript, not a
        // repeat.
        let detector = RepetitionDetector::default();
        let state = state_with_last("CONVERSATION");

        assert_eq!(
            detector.detect(&state, "CONVERSATION"),
            RepetitionCheck::none()
        );
    }

    #[test]
    fn long_repeat_without_markers_is_error() {
        let detector = RepetitionDetector::default();
        let long = "yesterday afternoon we walked along the river and watched the boats go by";
        let state = state_with_last(long);

        let check = detector.detect(&state, long);
        assert_eq!(check.kind, Some(RepetitionKind::Error));
    }

    #[test]
    fn affectionate_repeat_is_playful() {
        let detector = RepetitionDetector::default();
        let state = state_with_last("I love you so much my dear tutor, you are the best teacher ever");

        let check = detector.detect(
            &state,
            "I love you so much my dear tutor, you are the best teacher ever",
        );
        assert_eq!(check.kind, Some(RepetitionKind::Playful));
    }

    #[test]
    fn pending_correction_match_is_practice_and_takes_priority() {
        let detector = RepetitionDetector::default();
        let mut state = state_with_last("through the nose");
        state.pending_correction = Some(PendingCorrection {
            original_text: "from the nose".to_string(),
            corrected_text: "through the nose".to_string(),
            created_at: Utc::now(),
        });

        // Would otherwise classify as a memorization repeat; practice wins.
        let check = detector.detect(&state, "through the nose");
        assert_eq!(check.kind, Some(RepetitionKind::Practice));
    }

    #[test]
    fn near_miss_of_correction_is_not_practice() {
        let detector = RepetitionDetector::default();
        let mut state = SessionState::default();
        state.pending_correction = Some(PendingCorrection {
            original_text: "pay from the nose".to_string(),
            corrected_text: "through the nose".to_string(),
            created_at: Utc::now(),
        });

        assert_eq!(
            detector.detect(&state, "from the nose"),
            RepetitionCheck::none()
        );
    }

    #[test]
    fn detection_is_deterministic() {
        let detector = RepetitionDetector::default();
        let state = state_with_last("buenos días");

        let first = detector.detect(&state, "buenos días");
        let second = detector.detect(&state, "buenos días");
        assert_eq!(first, second);
    }
}
