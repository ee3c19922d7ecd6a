//! Canned-response variety: never reissue the same phrase twice in a session
//! for a given repetition category until the pool is exhausted.

use std::collections::HashMap;

use rand::seq::SliceRandom;
use tracing::debug;
use tutor_core::Language;

use crate::repetition::RepetitionKind;
use crate::session::SessionState;

/// Picks canned replies per repetition category, tracking used phrases in the
/// session's `used_patterns` sets. Pools are per language, falling back to
/// English for anything missing.
#[derive(Debug, Clone)]
pub struct ResponseVarietyPicker {
    pools: HashMap<(Language, RepetitionKind), Vec<String>>,
}

impl Default for ResponseVarietyPicker {
    fn default() -> Self {
        let mut pools: HashMap<(Language, RepetitionKind), Vec<String>> = HashMap::new();

        let mut add = |language: Language, kind: RepetitionKind, phrases: &[&str]| {
            pools.insert(
                (language, kind),
                phrases.iter().map(|s| s.to_string()).collect(),
            );
        };

        use Language::*;
        use RepetitionKind::*;

        add(English, Error, &[
            "It looks like your message came through twice — no worries! What were you about to say next?",
            "I think I heard that one twice. Shall we keep going?",
            "That message arrived again — let's pick up where we left off.",
        ]);
        add(English, Playful, &[
            "Ha! I see what you did there. Let's sneak in some practice anyway.",
            "Very sweet of you to say — twice, even! Now, back to our topic.",
            "You're in a fun mood today! Let's put that energy into the lesson.",
        ]);
        add(English, Memorization, &[
            "Nice repetition — saying it again really helps it stick. Can you use it in a new sentence?",
            "Good, you're drilling it in! Try changing one word this time.",
            "That's the spirit — repeat it once more, then let's build on it.",
        ]);

        add(Spanish, Error, &[
            "Parece que tu mensaje llegó dos veces, ¡no pasa nada! ¿Qué ibas a decir?",
            "Creo que escuché eso dos veces. ¿Seguimos?",
        ]);
        add(Spanish, Playful, &[
            "¡Ja! Ya veo lo que haces. Aprovechemos para practicar.",
            "¡Qué amable, y dos veces! Ahora, volvamos al tema.",
        ]);
        add(Spanish, Memorization, &[
            "Buena repetición: decirlo otra vez ayuda a memorizarlo. ¿Puedes usarlo en una frase nueva?",
            "¡Así se hace! Ahora cambia una palabra e inténtalo de nuevo.",
        ]);

        add(Italian, Error, &[
            "Sembra che il tuo messaggio sia arrivato due volte, nessun problema! Cosa stavi per dire?",
            "Credo di averlo sentito due volte. Continuiamo?",
        ]);
        add(Italian, Playful, &[
            "Ah! Ho capito il gioco. Approfittiamone per esercitarci.",
            "Che carino, e pure due volte! Ora torniamo al nostro argomento.",
        ]);
        add(Italian, Memorization, &[
            "Bella ripetizione: ridirlo aiuta a memorizzarlo. Sai usarlo in una frase nuova?",
            "Ottimo esercizio! Ora cambia una parola e riprova.",
        ]);

        add(French, Error, &[
            "On dirait que ton message est arrivé deux fois, pas de souci ! Tu voulais dire quoi ?",
            "Je crois avoir entendu ça deux fois. On continue ?",
        ]);
        add(French, Playful, &[
            "Ha ! Je vois ce que tu fais. Profitons-en pour pratiquer.",
            "C'est gentil, et deux fois en plus ! Revenons à notre sujet.",
        ]);
        add(French, Memorization, &[
            "Bonne répétition : le redire aide à le retenir. Tu peux l'utiliser dans une nouvelle phrase ?",
            "C'est bien ! Change un mot et réessaie.",
        ]);

        add(German, Error, &[
            "Deine Nachricht kam wohl doppelt an, kein Problem! Was wolltest du sagen?",
            "Ich glaube, das habe ich zweimal gehört. Machen wir weiter?",
        ]);
        add(German, Playful, &[
            "Ha! Ich sehe, was du da machst. Nutzen wir das zum Üben.",
            "Wie nett, sogar zweimal! Zurück zu unserem Thema.",
        ]);
        add(German, Memorization, &[
            "Gute Wiederholung: Es noch einmal zu sagen hilft beim Merken. Kannst du es in einem neuen Satz verwenden?",
            "So ist es richtig! Tausche ein Wort aus und versuch es noch einmal.",
        ]);

        add(Portuguese, Error, &[
            "Parece que sua mensagem chegou duas vezes, sem problema! O que você ia dizer?",
            "Acho que ouvi isso duas vezes. Vamos continuar?",
        ]);
        add(Portuguese, Playful, &[
            "Ha! Entendi a brincadeira. Vamos aproveitar para praticar.",
            "Que gentil, e duas vezes! Agora, de volta ao nosso assunto.",
        ]);
        add(Portuguese, Memorization, &[
            "Boa repetição: dizer de novo ajuda a memorizar. Consegue usar numa frase nova?",
            "É isso aí! Troque uma palavra e tente de novo.",
        ]);

        Self { pools }
    }
}

impl ResponseVarietyPicker {
    /// Picks a phrase for the category that has not been used this session.
    ///
    /// When every phrase has been used, the used-set for the category is
    /// cleared and the pool's first element is returned (deterministic reset,
    /// so termination is guaranteed). Otherwise the choice is uniform among
    /// the remaining phrases.
    pub fn pick(
        &self,
        state: &mut SessionState,
        kind: RepetitionKind,
        language: Language,
    ) -> String {
        let pool = self
            .pools
            .get(&(language, kind))
            .or_else(|| self.pools.get(&(Language::English, kind)))
            .expect("no pool for category; English pools must cover every short-circuit kind");

        let used = state.used_patterns.entry(kind).or_default();
        let remaining: Vec<&String> = pool.iter().filter(|p| !used.contains(*p)).collect();

        if remaining.is_empty() {
            debug!(?kind, "response pool exhausted, resetting used set");
            used.clear();
            let first = pool[0].clone();
            used.insert(first.clone());
            return first;
        }

        let chosen = remaining
            .choose(&mut rand::thread_rng())
            .expect("remaining is non-empty")
            .to_string();
        used.insert(chosen.clone());
        chosen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn n_picks_within_pool_size_are_distinct() {
        let picker = ResponseVarietyPicker::default();
        let mut state = SessionState::default();

        let pool_size = picker.pools[&(Language::English, RepetitionKind::Memorization)].len();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..pool_size {
            let phrase = picker.pick(&mut state, RepetitionKind::Memorization, Language::English);
            assert!(seen.insert(phrase), "phrase repeated before exhaustion");
        }
    }

    #[test]
    fn exhausted_pool_resets_to_first_element() {
        let picker = ResponseVarietyPicker::default();
        let mut state = SessionState::default();

        let pool = picker.pools[&(Language::English, RepetitionKind::Error)].clone();
        for _ in 0..pool.len() {
            picker.pick(&mut state, RepetitionKind::Error, Language::English);
        }

        let after_reset = picker.pick(&mut state, RepetitionKind::Error, Language::English);
        assert_eq!(after_reset, pool[0]);
        // The reset choice is recorded, so the next pick cannot repeat it.
        let next = picker.pick(&mut state, RepetitionKind::Error, Language::English);
        assert_ne!(next, after_reset);
    }

    #[test]
    fn categories_track_usage_independently() {
        let picker = ResponseVarietyPicker::default();
        let mut state = SessionState::default();

        picker.pick(&mut state, RepetitionKind::Error, Language::English);
        picker.pick(&mut state, RepetitionKind::Playful, Language::English);

        assert_eq!(state.used_patterns[&RepetitionKind::Error].len(), 1);
        assert_eq!(state.used_patterns[&RepetitionKind::Playful].len(), 1);
    }

    #[test]
    fn missing_language_pool_falls_back_to_english() {
        let mut pools = HashMap::new();
        pools.insert(
            (Language::English, RepetitionKind::Error),
            vec!["english only".to_string()],
        );
        let picker = ResponseVarietyPicker { pools };
        let mut state = SessionState::default();

        let phrase = picker.pick(&mut state, RepetitionKind::Error, Language::German);
        assert_eq!(phrase, "english only");
    }
}
