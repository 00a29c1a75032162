use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::StoreError;
use crate::models::job::JobRow;

/// Read/write access to stored job listings.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<JobRow>, StoreError>;

    /// Persists a lifecycle change. `row.version` is the version the caller read;
    /// a concurrent edit in between fails with `StoreError::Stale`.
    async fn save_status(&self, row: &JobRow) -> Result<(), StoreError>;
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn get(&self, id: Uuid) -> Result<Option<JobRow>, StoreError> {
        Ok(sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, title, required_skills, nice_to_have_skills,
                   min_experience, max_experience, salary_min, salary_max,
                   location, remote_type, status, version,
                   published_at, closed_at, created_at, updated_at
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_status(&self, row: &JobRow) -> Result<(), StoreError> {
        // Status does not feed the score, so `version` is left alone.
        let result = sqlx::query(
            r#"
            UPDATE jobs
            SET status = $3, published_at = $4, closed_at = $5, updated_at = $6
            WHERE id = $1 AND version = $2
            "#,
        )
        .bind(row.id)
        .bind(row.version)
        .bind(&row.status)
        .bind(row.published_at)
        .bind(row.closed_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Stale {
                entity: "job",
                id: row.id,
            });
        }
        Ok(())
    }
}
