//! Reply deduplication: keeps the tutor from anchoring on, or re-emitting,
//! its own repeated phrasing.

use std::collections::HashSet;

use tutor_core::Turn;

use crate::normalize::normalize;
use crate::similarity::similarity;

/// Similarity above which consecutive kept assistant turns collapse.
pub const NEAR_DUPLICATE_THRESHOLD: f64 = 0.7;

/// How many recent assistant replies are checked for an immediate repeat.
pub const RECENT_REPLY_WINDOW: usize = 3;

/// Filters prompt history and vets drafted replies for repeats.
#[derive(Debug, Clone)]
pub struct ReplyDeduplicator {
    near_duplicate_threshold: f64,
    recent_reply_window: usize,
}

impl Default for ReplyDeduplicator {
    fn default() -> Self {
        Self {
            near_duplicate_threshold: NEAR_DUPLICATE_THRESHOLD,
            recent_reply_window: RECENT_REPLY_WINDOW,
        }
    }
}

impl ReplyDeduplicator {
    /// Drops assistant turns that exactly duplicate an earlier kept assistant
    /// turn (after normalization), and assistant turns too similar to the
    /// immediately preceding kept assistant turn. User turns always pass.
    ///
    /// A reply that merely extends the previous kept reply ("Great job!" →
    /// "Great job, well done!") is a near-duplicate too, even though raw edit
    /// distance under-scores the pair; the prefix check covers that case.
    pub fn filter_history_for_prompt(&self, turns: &[Turn]) -> Vec<Turn> {
        let mut kept = Vec::with_capacity(turns.len());
        let mut seen_assistant: HashSet<String> = HashSet::new();
        let mut last_kept_assistant: Option<String> = None;

        for turn in turns {
            if turn.is_assistant() {
                let normalized = normalize(&turn.content);
                if seen_assistant.contains(&normalized) {
                    continue;
                }
                if let Some(prev) = &last_kept_assistant {
                    if similarity(prev, &turn.content) > self.near_duplicate_threshold
                        || is_extension(&normalize(prev), &normalized)
                    {
                        continue;
                    }
                }
                seen_assistant.insert(normalized);
                last_kept_assistant = Some(turn.content.clone());
            }
            kept.push(turn.clone());
        }

        kept
    }

    /// True when the candidate reply matches (after normalization) any of the
    /// last 3 assistant turns in the full persisted history.
    pub fn is_immediate_repeat(&self, full_history: &[Turn], candidate: &str) -> bool {
        let candidate = normalize(candidate);
        full_history
            .iter()
            .rev()
            .filter(|t| t.is_assistant())
            .take(self.recent_reply_window)
            .any(|t| normalize(&t.content) == candidate)
    }
}

/// One normalized string extends the other (shared non-empty prefix).
fn is_extension(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.starts_with(b) || b.starts_with(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assistant(content: &str) -> Turn {
        Turn::assistant(content)
    }

    fn user(content: &str) -> Turn {
        Turn::user(content)
    }

    #[test]
    fn near_duplicate_assistant_turns_collapse() {
        // Seed scenario from the dedup contract.
        let dedup = ReplyDeduplicator::default();
        let turns = vec![assistant("Great job!"), assistant("Great job, well done!")];

        let kept = dedup.filter_history_for_prompt(&turns);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].content, "Great job!");
    }

    #[test]
    fn exact_duplicates_drop_even_when_far_apart() {
        let dedup = ReplyDeduplicator::default();
        let turns = vec![
            assistant("What did you eat today?"),
            user("pasta"),
            assistant("Pasta is a classic choice in Italy, tell me more about the sauce."),
            user("tomato"),
            assistant("What did you eat today?"),
        ];

        let kept = dedup.filter_history_for_prompt(&turns);
        let assistant_contents: Vec<&str> = kept
            .iter()
            .filter(|t| t.is_assistant())
            .map(|t| t.content.as_str())
            .collect();
        assert_eq!(assistant_contents.len(), 2);
        assert_eq!(kept.iter().filter(|t| t.is_user()).count(), 2);
    }

    #[test]
    fn user_turns_always_pass() {
        let dedup = ReplyDeduplicator::default();
        let turns = vec![user("hello"), user("hello"), user("hello")];

        assert_eq!(dedup.filter_history_for_prompt(&turns).len(), 3);
    }

    #[test]
    fn dissimilar_assistant_turns_are_kept() {
        let dedup = ReplyDeduplicator::default();
        let turns = vec![
            assistant("What's your favorite food?"),
            assistant("Let's talk about your weekend plans instead."),
        ];

        assert_eq!(dedup.filter_history_for_prompt(&turns).len(), 2);
    }

    #[test]
    fn immediate_repeat_matches_last_three_replies() {
        let dedup = ReplyDeduplicator::default();
        let history = vec![
            assistant("oldest reply"),
            assistant("reply a"),
            user("something"),
            assistant("reply b"),
            assistant("reply c"),
        ];

        assert!(dedup.is_immediate_repeat(&history, "Reply B!"));
        assert!(dedup.is_immediate_repeat(&history, "reply c"));
        // Outside the 3-reply window.
        assert!(!dedup.is_immediate_repeat(&history, "oldest reply"));
        assert!(!dedup.is_immediate_repeat(&history, "fresh reply"));
    }

    #[test]
    fn immediate_repeat_on_empty_history_is_false() {
        let dedup = ReplyDeduplicator::default();
        assert!(!dedup.is_immediate_repeat(&[], "anything"));
    }
}
