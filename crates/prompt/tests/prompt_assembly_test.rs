//! Integration tests for prompt assembly.
//!
//! Covers: turn conversion order and roles, summary wrapping, summarization
//! request content and language pinning, and the correction context block.

use prompt::{summarization_request, turns_to_messages, wrap_summary, MessageRole};
use tutor_core::{Language, Turn};

#[test]
fn turns_convert_in_order_with_roles() {
    let turns = vec![
        Turn::user("hola"),
        Turn::assistant("¡Hola! ¿Cómo estás?"),
        Turn::user("bien"),
    ];

    let messages = turns_to_messages(&turns);
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[0].role, MessageRole::User);
    assert_eq!(messages[1].role, MessageRole::Assistant);
    assert_eq!(messages[2].role, MessageRole::User);
    assert_eq!(messages[1].content, "¡Hola! ¿Cómo estás?");
}

#[test]
fn wrapped_summary_is_marked() {
    let wrapped = wrap_summary("The learner likes cooking.");
    assert!(wrapped.starts_with("[Previous conversation summary:"));
    assert!(wrapped.contains("The learner likes cooking."));
    assert!(wrapped.ends_with(']'));
}

#[test]
fn summarization_request_includes_turns_and_language() {
    let turns = vec![Turn::user("I like pizza"), Turn::assistant("Who doesn't!")];

    let request = summarization_request(&turns, Language::Italian);
    assert!(request.contains("Italian"));
    assert!(request.contains("User: I like pizza"));
    assert!(request.contains("Assistant: Who doesn't!"));
}

#[test]
fn correction_context_names_both_forms() {
    let block = prompt::correction_context("pay from the nose", "through the nose");
    assert!(block.contains("pay from the nose"));
    assert!(block.contains("through the nose"));
}
