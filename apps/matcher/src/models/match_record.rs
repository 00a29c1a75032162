use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-criterion scores, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub skills: f64,
    pub experience: f64,
    pub salary: f64,
    pub location: f64,
}

/// One scored (résumé, job) pair. `(resume_id, job_id)` is unique in storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct MatchRecord {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub skills: f64,
    pub experience: f64,
    pub salary: f64,
    pub location: f64,
    /// 0 – 100
    pub total_score: f64,
    pub scorer_version: String,
    pub calculated_at: DateTime<Utc>,
}

impl MatchRecord {
    pub fn sub_scores(&self) -> SubScores {
        SubScores {
            skills: self.skills,
            experience: self.experience,
            salary: self.salary,
            location: self.location,
        }
    }

    pub fn projection(&self) -> MatchProjection {
        MatchProjection {
            resume_id: self.resume_id,
            job_id: self.job_id,
            total_score: self.total_score,
            sub_scores: self.sub_scores(),
            calculated_at: self.calculated_at,
            scorer_version: self.scorer_version.clone(),
        }
    }
}

/// JSON shape returned by the scoring API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchProjection {
    pub resume_id: Uuid,
    pub job_id: Uuid,
    pub total_score: f64,
    pub sub_scores: SubScores,
    pub calculated_at: DateTime<Utc>,
    pub scorer_version: String,
}

/// Ranking order: total score desc, then skills desc, then most recent first.
pub fn ranking_order(a: &MatchRecord, b: &MatchRecord) -> Ordering {
    b.total_score
        .total_cmp(&a.total_score)
        .then_with(|| b.skills.total_cmp(&a.skills))
        .then_with(|| b.calculated_at.cmp(&a.calculated_at))
}

pub fn rank_matches(records: &mut [MatchRecord]) {
    records.sort_by(ranking_order);
}
