//! Integration tests for [`storage::SqliteTurnRepository`].
//!
//! Covers: schema creation, save/load round trip in insertion order,
//! session isolation, and clear_session.

use storage::{SqliteTurnRepository, TurnRepository};
use tempfile::tempdir;
use tutor_core::{Turn, TurnRole};

async fn repo_in(dir: &tempfile::TempDir) -> SqliteTurnRepository {
    let path = dir.path().join("turns.db");
    SqliteTurnRepository::new(path.to_str().unwrap())
        .await
        .unwrap()
}

/// **Test: Save then load returns turns in insertion order with roles intact.**
#[tokio::test]
async fn test_save_and_load_round_trip() {
    let dir = tempdir().unwrap();
    let repo = repo_in(&dir).await;

    repo.save_turn("s1", &Turn::user("ciao")).await.unwrap();
    repo.save_turn("s1", &Turn::assistant("Ciao! Come stai?"))
        .await
        .unwrap();

    let history = repo.load_history("s1").await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].role, TurnRole::User);
    assert_eq!(history[0].content, "ciao");
    assert_eq!(history[1].role, TurnRole::Assistant);
    assert_eq!(history[1].content, "Ciao! Come stai?");
}

/// **Test: Histories are per-session; unknown sessions load empty.**
#[tokio::test]
async fn test_session_isolation() {
    let dir = tempdir().unwrap();
    let repo = repo_in(&dir).await;

    repo.save_turn("a", &Turn::user("hello")).await.unwrap();

    assert_eq!(repo.load_history("a").await.unwrap().len(), 1);
    assert!(repo.load_history("b").await.unwrap().is_empty());
}

/// **Test: clear_session removes one session's turns and nothing else.**
#[tokio::test]
async fn test_clear_session() {
    let dir = tempdir().unwrap();
    let repo = repo_in(&dir).await;

    repo.save_turn("a", &Turn::user("hello")).await.unwrap();
    repo.save_turn("b", &Turn::user("hola")).await.unwrap();

    repo.clear_session("a").await.unwrap();

    assert!(repo.load_history("a").await.unwrap().is_empty());
    assert_eq!(repo.load_history("b").await.unwrap().len(), 1);
}
