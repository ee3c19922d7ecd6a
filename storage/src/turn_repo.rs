//! Turn repository: SQLite persistence for per-session conversation history.
//!
//! Uses SqlitePoolManager; rows are returned in insertion order (rowid), which
//! is the only ordering the engine depends on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::info;
use tutor_core::{Turn, TurnRole};
use uuid::Uuid;

use crate::error::StorageError;
use crate::repository::TurnRepository;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteTurnRepository {
    pool_manager: SqlitePoolManager,
}

impl SqliteTurnRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool_manager = SqlitePoolManager::new(database_url).await?;
        let repo = Self { pool_manager };
        repo.init().await?;
        Ok(repo)
    }

    async fn init(&self) -> Result<(), StorageError> {
        info!("Creating database tables if not exist");

        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS turns (
                id TEXT PRIMARY KEY,
                session_id TEXT NOT NULL,
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::from)?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_turns_session_id ON turns(session_id);
            CREATE INDEX IF NOT EXISTS idx_turns_created_at ON turns(created_at);
            "#,
        )
        .execute(pool)
        .await
        .map_err(StorageError::from)?;

        Ok(())
    }

    fn role_to_str(role: TurnRole) -> &'static str {
        match role {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        }
    }

    fn role_from_str(s: &str) -> Result<TurnRole, StorageError> {
        match s {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(StorageError::Database(format!("unknown role: {}", other))),
        }
    }
}

#[async_trait]
impl TurnRepository for SqliteTurnRepository {
    async fn save_turn(&self, session_id: &str, turn: &Turn) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query(
            r#"
            INSERT INTO turns (id, session_id, role, content, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(turn.id.to_string())
        .bind(session_id)
        .bind(Self::role_to_str(turn.role))
        .bind(&turn.content)
        .bind(turn.timestamp.to_rfc3339())
        .execute(pool)
        .await
        .map_err(StorageError::from)?;

        info!(session_id, turn_id = %turn.id, "Saved turn");
        Ok(())
    }

    async fn load_history(&self, session_id: &str) -> Result<Vec<Turn>, StorageError> {
        let pool = self.pool_manager.pool();

        let rows = sqlx::query(
            r#"
            SELECT id, role, content, created_at FROM turns
            WHERE session_id = ?
            ORDER BY rowid
            "#,
        )
        .bind(session_id)
        .fetch_all(pool)
        .await
        .map_err(StorageError::from)?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in rows {
            let id_str: String = row.get("id");
            let role_str: String = row.get("role");
            let content: String = row.get("content");
            let created_at: String = row.get("created_at");

            let id = Uuid::parse_str(&id_str)
                .map_err(|e| StorageError::Database(format!("bad turn id: {}", e)))?;
            let timestamp = DateTime::parse_from_rfc3339(&created_at)
                .map_err(|e| StorageError::Database(format!("bad timestamp: {}", e)))?
                .with_timezone(&Utc);

            turns.push(Turn {
                id,
                role: Self::role_from_str(&role_str)?,
                content,
                timestamp,
            });
        }

        Ok(turns)
    }

    async fn clear_session(&self, session_id: &str) -> Result<(), StorageError> {
        let pool = self.pool_manager.pool();

        sqlx::query("DELETE FROM turns WHERE session_id = ?")
            .bind(session_id)
            .execute(pool)
            .await
            .map_err(StorageError::from)?;

        info!(session_id, "Cleared session history");
        Ok(())
    }
}
