//! Transcript-quality gate: flags inputs that look like transcription noise
//! rather than real speech or typed text.
//!
//! The lists are configuration data, not logic; [`QualityLists::default`]
//! seeds them for the six supported languages, and deployments can swap them
//! without touching the matching rules.

/// Vocabulary for the quality gate.
#[derive(Debug, Clone)]
pub struct QualityLists {
    /// Short valid utterances that must never be flagged, checked first.
    pub allowed_short: Vec<String>,
    /// Meta-words the speech provider emits when it hears itself described
    /// ("conversation", "talking", …) across supported languages; a
    /// whole-string match in any case flags the input.
    pub meta_words: Vec<String>,
}

impl Default for QualityLists {
    fn default() -> Self {
        let allowed_short = [
            // en
            "hi", "hey", "yes", "no", "ok", "okay", "bye", "thanks",
            // es
            "hola", "sí", "adiós", "gracias", "vale",
            // it
            "ciao", "sì", "grazie", "prego",
            // fr
            "oui", "non", "merci", "salut",
            // de
            "ja", "nein", "hallo", "danke", "tschüss",
            // pt
            "olá", "oi", "sim", "não", "obrigado", "obrigada",
        ];
        let meta_words = [
            "conversation", "talking", "speaking",
            "conversación", "hablando",
            "conversazione", "parlando",
            "parler",
            "gespräch", "sprechen",
            "conversa", "falando",
        ];
        Self {
            allowed_short: allowed_short.iter().map(|s| s.to_string()).collect(),
            meta_words: meta_words.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Gate for low-signal transcripts. Callers must skip repetition and
/// correction logic entirely when this returns true; it is a gate, not a
/// classifier with confidence.
#[derive(Debug, Clone, Default)]
pub struct TranscriptQualityClassifier {
    lists: QualityLists,
}

impl TranscriptQualityClassifier {
    pub fn new(lists: QualityLists) -> Self {
        Self { lists }
    }

    /// True when the text looks like transcription noise.
    ///
    /// Order matters: the allow-list protects short valid utterances
    /// unconditionally, then the low-signal patterns are checked.
    pub fn is_poor_quality(&self, text: &str) -> bool {
        let trimmed = text.trim();
        let lowered = trimmed.to_lowercase();

        if self.lists.allowed_short.iter().any(|w| *w == lowered) {
            return false;
        }

        if self.lists.meta_words.iter().any(|w| *w == lowered) {
            return true;
        }

        let char_count = trimmed.chars().count();

        // Strings of one or two letters.
        if (1..=2).contains(&char_count) && trimmed.chars().all(|c| c.is_alphabetic()) {
            return true;
        }

        // A single all-uppercase token of length >= 3.
        if char_count >= 3
            && !trimmed.contains(char::is_whitespace)
            && trimmed.chars().any(|c| c.is_alphabetic())
            && trimmed
                .chars()
                .filter(|c| c.is_alphabetic())
                .all(|c| c.is_uppercase())
        {
            return true;
        }

        false
    }
}
