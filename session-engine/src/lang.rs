//! Localized fixed messages: clarification, provider-failure fallback, and
//! practice templates, in the session's active language.

use tutor_core::Language;

/// Sent when the transcript failed the quality gate and was not a repeat.
/// Never forwarded to reply generation.
pub fn clarification_message(language: Language) -> &'static str {
    match language {
        Language::English => "Sorry, I didn't quite catch that. Could you say it again?",
        Language::Spanish => "Perdona, no te he entendido bien. ¿Puedes repetirlo?",
        Language::Italian => "Scusa, non ho capito bene. Puoi ripeterlo?",
        Language::French => "Désolé, je n'ai pas bien compris. Tu peux répéter ?",
        Language::German => "Entschuldigung, das habe ich nicht ganz verstanden. Kannst du es wiederholen?",
        Language::Portuguese => "Desculpe, não entendi direito. Pode repetir?",
    }
}

/// Sent when the generation provider failed or timed out; the session stays
/// usable for the next turn.
pub fn fallback_message(language: Language) -> &'static str {
    match language {
        Language::English => "Sorry, something went wrong on my side. Let's try that once more!",
        Language::Spanish => "Perdona, algo ha fallado por mi parte. ¡Inténtalo otra vez!",
        Language::Italian => "Scusa, qualcosa è andato storto da parte mia. Riproviamo!",
        Language::French => "Désolé, quelque chose s'est mal passé de mon côté. On réessaie ?",
        Language::German => "Entschuldigung, bei mir ist etwas schiefgelaufen. Versuchen wir es noch einmal!",
        Language::Portuguese => "Desculpe, algo deu errado do meu lado. Vamos tentar de novo!",
    }
}

/// Reply for a successful practice attempt: confirms the corrected form and
/// maps it into a topic-relevant follow-up question.
pub fn practice_success_message(language: Language, corrected: &str) -> String {
    match language {
        Language::English => format!(
            "Perfect — \"{corrected}\" is exactly right! Now, can you use \"{corrected}\" in a sentence about your own life?"
        ),
        Language::Spanish => format!(
            "¡Perfecto! \"{corrected}\" es exactamente así. ¿Puedes usar \"{corrected}\" en una frase sobre tu vida?"
        ),
        Language::Italian => format!(
            "Perfetto! \"{corrected}\" è proprio così. Riesci a usare \"{corrected}\" in una frase sulla tua vita?"
        ),
        Language::French => format!(
            "Parfait — \"{corrected}\", c'est exactement ça ! Tu peux utiliser \"{corrected}\" dans une phrase sur ta vie ?"
        ),
        Language::German => format!(
            "Perfekt — \"{corrected}\" ist genau richtig! Kannst du \"{corrected}\" in einem Satz über dein Leben verwenden?"
        ),
        Language::Portuguese => format!(
            "Perfeito — \"{corrected}\" é exatamente isso! Consegue usar \"{corrected}\" numa frase sobre a sua vida?"
        ),
    }
}

/// Reply for a missed practice attempt: asks for the corrected text verbatim
/// again. The pending correction stays set.
pub fn practice_retry_message(language: Language, corrected: &str) -> String {
    match language {
        Language::English => format!(
            "Close, but not quite. Try repeating it exactly: \"{corrected}\"."
        ),
        Language::Spanish => format!(
            "Casi, pero no del todo. Intenta repetirlo exactamente: \"{corrected}\"."
        ),
        Language::Italian => format!(
            "Quasi, ma non proprio. Prova a ripeterlo esattamente: \"{corrected}\"."
        ),
        Language::French => format!(
            "Presque, mais pas tout à fait. Essaie de répéter exactement : \"{corrected}\"."
        ),
        Language::German => format!(
            "Fast, aber nicht ganz. Versuch es genau zu wiederholen: \"{corrected}\"."
        ),
        Language::Portuguese => format!(
            "Quase, mas não exatamente. Tente repetir exatamente: \"{corrected}\"."
        ),
    }
}
