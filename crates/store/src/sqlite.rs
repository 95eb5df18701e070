//! SQLite store — durable persistence for agents, documents, chunks, and
//! grants.
//!
//! Single database file, WAL journaling. Schema highlights:
//! - `agents` unique on normalized handle
//! - `chunks` keyed by (document_id, seq), indexed by (agent_id, tier) for
//!   the ceiling-bounded candidate query
//! - `grants` keyed by (agent_id, viewer_handle); upserts are one
//!   `INSERT .. ON CONFLICT DO UPDATE` statement, so concurrent writes to
//!   the same key serialize instead of interleaving

use confidant_core::agent::{Agent, AgentId};
use confidant_core::document::{Chunk, DocumentId, TrainingDocument};
use confidant_core::error::StorageError;
use confidant_core::grant::PermissionGrant;
use confidant_core::retrieval::Candidate;
use confidant_core::store::{AgentStore, ChunkStore, GrantStore};
use confidant_core::Tier;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

/// A durable SQLite implementation of all three store traits.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database at `path` and run migrations.
    pub async fn new(path: &str) -> Result<Self, StorageError> {
        let options = SqliteConnectOptions::from_str(path)
            .map_err(|e| StorageError::Backend(format!("Invalid SQLite path: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .pragma("foreign_keys", "ON");

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite store initialized at {path}");
        Ok(store)
    }

    /// Create from an existing pool (useful for testing).
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, StorageError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS agents (
                id           TEXT PRIMARY KEY,
                handle       TEXT UNIQUE NOT NULL,
                owner_handle TEXT NOT NULL,
                persona      TEXT NOT NULL,
                created_at   TEXT NOT NULL,
                updated_at   TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("agents table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id             TEXT PRIMARY KEY,
                agent_id       TEXT NOT NULL,
                tier           INTEGER NOT NULL,
                title          TEXT,
                source         TEXT,
                content        TEXT NOT NULL,
                content_digest TEXT NOT NULL,
                created_at     TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("documents table: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id          TEXT NOT NULL,
                document_id TEXT NOT NULL,
                agent_id    TEXT NOT NULL,
                tier        INTEGER NOT NULL,
                seq         INTEGER NOT NULL,
                text        TEXT NOT NULL,
                PRIMARY KEY (document_id, seq),
                FOREIGN KEY (document_id) REFERENCES documents(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("chunks table: {e}")))?;

        // The candidate query filters on (agent_id, tier <= ceiling).
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chunks_agent_tier ON chunks(agent_id, tier)",
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("chunks index: {e}")))?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS grants (
                agent_id      TEXT NOT NULL,
                viewer_handle TEXT NOT NULL,
                max_tier      INTEGER NOT NULL,
                granted_at    TEXT NOT NULL,
                PRIMARY KEY (agent_id, viewer_handle)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::MigrationFailed(format!("grants table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }

    fn parse_tier(rank: i64) -> Result<Tier, StorageError> {
        u8::try_from(rank)
            .ok()
            .and_then(Tier::from_rank)
            .ok_or_else(|| StorageError::QueryFailed(format!("invalid tier rank {rank}")))
    }

    fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StorageError> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StorageError::QueryFailed(format!("invalid timestamp '{raw}': {e}")))
    }

    fn row_to_agent(row: &sqlx::sqlite::SqliteRow) -> Result<Agent, StorageError> {
        Ok(Agent {
            id: AgentId(row.try_get("id").map_err(query_err)?),
            handle: row.try_get("handle").map_err(query_err)?,
            owner_handle: row.try_get("owner_handle").map_err(query_err)?,
            persona: row.try_get("persona").map_err(query_err)?,
            created_at: Self::parse_timestamp(
                &row.try_get::<String, _>("created_at").map_err(query_err)?,
            )?,
            updated_at: Self::parse_timestamp(
                &row.try_get::<String, _>("updated_at").map_err(query_err)?,
            )?,
        })
    }

    fn row_to_document(row: &sqlx::sqlite::SqliteRow) -> Result<TrainingDocument, StorageError> {
        Ok(TrainingDocument {
            id: DocumentId(row.try_get("id").map_err(query_err)?),
            agent_id: AgentId(row.try_get("agent_id").map_err(query_err)?),
            tier: Self::parse_tier(row.try_get("tier").map_err(query_err)?)?,
            title: row.try_get("title").map_err(query_err)?,
            source: row.try_get("source").map_err(query_err)?,
            content: row.try_get("content").map_err(query_err)?,
            content_digest: row.try_get("content_digest").map_err(query_err)?,
            created_at: Self::parse_timestamp(
                &row.try_get::<String, _>("created_at").map_err(query_err)?,
            )?,
        })
    }

    fn row_to_candidate(row: &sqlx::sqlite::SqliteRow) -> Result<Candidate, StorageError> {
        Ok(Candidate {
            chunk: Chunk {
                id: row.try_get("id").map_err(query_err)?,
                document_id: DocumentId(row.try_get("document_id").map_err(query_err)?),
                agent_id: AgentId(row.try_get("agent_id").map_err(query_err)?),
                tier: Self::parse_tier(row.try_get("tier").map_err(query_err)?)?,
                seq: row.try_get::<i64, _>("seq").map_err(query_err)? as usize,
                text: row.try_get("text").map_err(query_err)?,
            },
            title: row.try_get("title").map_err(query_err)?,
            source: row.try_get("source").map_err(query_err)?,
            document_created_at: Self::parse_timestamp(
                &row.try_get::<String, _>("doc_created_at").map_err(query_err)?,
            )?,
        })
    }

    fn row_to_grant(row: &sqlx::sqlite::SqliteRow) -> Result<PermissionGrant, StorageError> {
        Ok(PermissionGrant {
            agent_id: AgentId(row.try_get("agent_id").map_err(query_err)?),
            viewer_handle: row.try_get("viewer_handle").map_err(query_err)?,
            max_tier: Self::parse_tier(row.try_get("max_tier").map_err(query_err)?)?,
            granted_at: Self::parse_timestamp(
                &row.try_get::<String, _>("granted_at").map_err(query_err)?,
            )?,
        })
    }
}

fn query_err(e: sqlx::Error) -> StorageError {
    StorageError::QueryFailed(e.to_string())
}

#[async_trait]
impl AgentStore for SqliteStore {
    async fn create(&self, agent: Agent) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO agents (id, handle, owner_handle, persona, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&agent.id.0)
        .bind(&agent.handle)
        .bind(&agent.owner_handle)
        .bind(&agent.persona)
        .bind(agent.created_at.to_rfc3339())
        .bind(agent.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                    Err(StorageError::Duplicate(format!("agent handle '{}'", agent.handle)))
                } else {
                    Err(query_err(e))
                }
            }
        }
    }

    async fn by_handle(&self, agent_handle: &str) -> Result<Option<Agent>, StorageError> {
        let row = sqlx::query("SELECT * FROM agents WHERE handle = ?")
            .bind(agent_handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(Self::row_to_agent).transpose()
    }

    async fn by_id(&self, id: &AgentId) -> Result<Option<Agent>, StorageError> {
        let row = sqlx::query("SELECT * FROM agents WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(Self::row_to_agent).transpose()
    }

    async fn update_persona(&self, id: &AgentId, persona: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("UPDATE agents SET persona = ?, updated_at = ? WHERE id = ?")
            .bind(persona)
            .bind(Utc::now().to_rfc3339())
            .bind(&id.0)
            .execute(&self.pool)
            .await
            .map_err(query_err)?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl ChunkStore for SqliteStore {
    async fn append_document(
        &self,
        document: TrainingDocument,
        chunks: Vec<Chunk>,
    ) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(query_err)?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, agent_id, tier, title, source, content, content_digest, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&document.id.0)
        .bind(&document.agent_id.0)
        .bind(i64::from(document.tier.rank()))
        .bind(&document.title)
        .bind(&document.source)
        .bind(&document.content)
        .bind(&document.content_digest)
        .bind(document.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        for chunk in &chunks {
            sqlx::query(
                r#"
                INSERT INTO chunks (id, document_id, agent_id, tier, seq, text)
                VALUES (?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&chunk.id)
            .bind(&chunk.document_id.0)
            .bind(&chunk.agent_id.0)
            .bind(i64::from(chunk.tier.rank()))
            .bind(chunk.seq as i64)
            .bind(&chunk.text)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        }

        tx.commit().await.map_err(query_err)
    }

    async fn candidates(
        &self,
        agent_id: &AgentId,
        ceiling: Tier,
    ) -> Result<Vec<Candidate>, StorageError> {
        // Single query = single consistent snapshot. The tier bound is part
        // of the query itself, so out-of-ceiling chunks never leave storage.
        let rows = sqlx::query(
            r#"
            SELECT c.id, c.document_id, c.agent_id, c.tier, c.seq, c.text,
                   d.title, d.source, d.created_at AS doc_created_at
            FROM chunks c
            JOIN documents d ON d.id = c.document_id
            WHERE c.agent_id = ? AND c.tier <= ?
            ORDER BY d.created_at DESC, c.seq ASC
            "#,
        )
        .bind(&agent_id.0)
        .bind(i64::from(ceiling.rank()))
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)?;

        rows.iter().map(Self::row_to_candidate).collect()
    }

    async fn document(&self, id: &DocumentId) -> Result<Option<TrainingDocument>, StorageError> {
        let row = sqlx::query("SELECT * FROM documents WHERE id = ?")
            .bind(&id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(Self::row_to_document).transpose()
    }

    async fn chunk_count(&self, agent_id: &AgentId) -> Result<usize, StorageError> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM chunks WHERE agent_id = ?")
            .bind(&agent_id.0)
            .fetch_one(&self.pool)
            .await
            .map_err(query_err)?;
        let n: i64 = row.try_get("n").map_err(query_err)?;
        Ok(n as usize)
    }
}

#[async_trait]
impl GrantStore for SqliteStore {
    async fn upsert(&self, grant: PermissionGrant) -> Result<(), StorageError> {
        // Single-statement upsert: atomic per (agent_id, viewer_handle) key.
        sqlx::query(
            r#"
            INSERT INTO grants (agent_id, viewer_handle, max_tier, granted_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(agent_id, viewer_handle) DO UPDATE SET
                max_tier = excluded.max_tier,
                granted_at = excluded.granted_at
            "#,
        )
        .bind(&grant.agent_id.0)
        .bind(&grant.viewer_handle)
        .bind(i64::from(grant.max_tier.rank()))
        .bind(grant.granted_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(query_err)?;
        Ok(())
    }

    async fn get(
        &self,
        agent_id: &AgentId,
        viewer_handle: &str,
    ) -> Result<Option<PermissionGrant>, StorageError> {
        let row = sqlx::query("SELECT * FROM grants WHERE agent_id = ? AND viewer_handle = ?")
            .bind(&agent_id.0)
            .bind(viewer_handle)
            .fetch_optional(&self.pool)
            .await
            .map_err(query_err)?;
        row.as_ref().map(Self::row_to_grant).transpose()
    }

    async fn list_for_agent(
        &self,
        agent_id: &AgentId,
    ) -> Result<Vec<PermissionGrant>, StorageError> {
        let rows = sqlx::query(
            "SELECT * FROM grants WHERE agent_id = ? ORDER BY viewer_handle ASC",
        )
        .bind(&agent_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(query_err)?;
        rows.iter().map(Self::row_to_grant).collect()
    }
}
