use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::resume::ResumeFacts;

/// One stored résumé: the cleaned text of its latest upload plus, once
/// analyzed, the facts extracted from exactly that version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResumeDocument {
    pub id: Uuid,
    /// Bumped on every upload; part of the match cache key.
    pub version: i32,
    pub content_type: String,
    #[serde(skip_serializing)]
    pub text: String,
    pub facts: Option<ResumeFacts>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Stores a new upload. An existing id gets `version + 1` and loses its facts.
    async fn store_document(
        &self,
        id: Uuid,
        content_type: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ResumeDocument, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ResumeDocument>, StoreError>;

    /// Attaches facts to `version`. Facts are written once per version: returns
    /// `false` when the version moved on or facts were already present.
    async fn save_facts(
        &self,
        id: Uuid,
        version: i32,
        facts: &ResumeFacts,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError>;
}

#[derive(Debug, FromRow)]
struct ResumeRow {
    id: Uuid,
    version: i32,
    content_type: String,
    text: String,
    facts: Option<Json<ResumeFacts>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeDocument {
    fn from(row: ResumeRow) -> Self {
        Self {
            id: row.id,
            version: row.version,
            content_type: row.content_type,
            text: row.text,
            facts: row.facts.map(|Json(facts)| facts),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

pub struct PgResumeStore {
    pool: PgPool,
}

impl PgResumeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResumeStore for PgResumeStore {
    async fn store_document(
        &self,
        id: Uuid,
        content_type: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ResumeDocument, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes (id, version, content_type, text, facts, created_at, updated_at)
            VALUES ($1, 1, $2, $3, NULL, $4, $4)
            ON CONFLICT (id) DO UPDATE
            SET version = resumes.version + 1,
                content_type = EXCLUDED.content_type,
                text = EXCLUDED.text,
                facts = NULL,
                updated_at = EXCLUDED.updated_at
            RETURNING id, version, content_type, text, facts, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(content_type)
        .bind(text)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResumeDocument>, StoreError> {
        let row = sqlx::query_as::<_, ResumeRow>(
            r#"
            SELECT id, version, content_type, text, facts, created_at, updated_at
            FROM resumes
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(ResumeDocument::from))
    }

    async fn save_facts(
        &self,
        id: Uuid,
        version: i32,
        facts: &ResumeFacts,
        now: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE resumes
            SET facts = $3, updated_at = $4
            WHERE id = $1 AND version = $2 AND facts IS NULL
            "#,
        )
        .bind(id)
        .bind(version)
        .bind(Json(facts))
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }
}
