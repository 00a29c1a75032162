use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;
use uuid::Uuid;

use super::{clamp_limit, MatchRepository, RepositoryError};
use crate::models::match_record::MatchRecord;

/// `match_records` has a unique index on `(resume_id, job_id)`.
pub struct PgMatchRepository {
    pool: PgPool,
}

impl PgMatchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl MatchRepository for PgMatchRepository {
    async fn upsert(&self, record: &MatchRecord) -> Result<MatchRecord, RepositoryError> {
        let written = sqlx::query_as::<_, MatchRecord>(
            r#"
            INSERT INTO match_records
                (id, resume_id, job_id, skills, experience, salary, location,
                 total_score, scorer_version, calculated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (resume_id, job_id) DO UPDATE
            SET skills = EXCLUDED.skills,
                experience = EXCLUDED.experience,
                salary = EXCLUDED.salary,
                location = EXCLUDED.location,
                total_score = EXCLUDED.total_score,
                scorer_version = EXCLUDED.scorer_version,
                calculated_at = EXCLUDED.calculated_at
            RETURNING *
            "#,
        )
        .bind(record.id)
        .bind(record.resume_id)
        .bind(record.job_id)
        .bind(record.skills)
        .bind(record.experience)
        .bind(record.salary)
        .bind(record.location)
        .bind(record.total_score)
        .bind(&record.scorer_version)
        .bind(record.calculated_at)
        .fetch_one(&self.pool)
        .await;

        match written {
            Ok(row) => Ok(row),
            // Lost a race on the unique index: the other writer's row stands.
            Err(e) if is_unique_violation(&e) => {
                warn!(
                    resume_id = %record.resume_id,
                    job_id = %record.job_id,
                    "Match upsert raced; re-reading the stored row"
                );
                self.get(record.resume_id, record.job_id)
                    .await?
                    .ok_or(RepositoryError::Conflict {
                        resume_id: record.resume_id,
                        job_id: record.job_id,
                    })
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get(
        &self,
        resume_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<MatchRecord>, RepositoryError> {
        Ok(sqlx::query_as::<_, MatchRecord>(
            "SELECT * FROM match_records WHERE resume_id = $1 AND job_id = $2",
        )
        .bind(resume_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn top_for_job(
        &self,
        job_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        Ok(sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT * FROM match_records
            WHERE job_id = $1
            ORDER BY total_score DESC, skills DESC, calculated_at DESC
            LIMIT $2
            "#,
        )
        .bind(job_id)
        .bind(clamp_limit(limit) as i64)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn top_for_resume(
        &self,
        resume_id: Uuid,
        limit: usize,
    ) -> Result<Vec<MatchRecord>, RepositoryError> {
        Ok(sqlx::query_as::<_, MatchRecord>(
            r#"
            SELECT * FROM match_records
            WHERE resume_id = $1
            ORDER BY total_score DESC, skills DESC, calculated_at DESC
            LIMIT $2
            "#,
        )
        .bind(resume_id)
        .bind(clamp_limit(limit) as i64)
        .fetch_all(&self.pool)
        .await?)
    }
}
