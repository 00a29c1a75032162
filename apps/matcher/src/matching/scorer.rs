//! Match Scorer: pluggable, trait-based composite score for a (résumé, job) pair.
//!
//! Default: `WeightedScorer`. The pipeline holds an `Arc<dyn MatchScorer>`; the
//! scorer's `version()` is part of every cache key, so changing a weight or a
//! formula means changing the version string.

use serde::{Deserialize, Serialize};

use super::vectorizer::{experience_index, job_vector, resume_vector, skill_block};
use crate::models::job::{JobFacts, RemoteType};
use crate::models::match_record::SubScores;
use crate::models::resume::ResumeFacts;
use crate::taxonomy::{fold_token, Taxonomy};

pub const SCORER_VERSION: &str = "weighted-jaccard/1";

/// Smallest half-band, in years, over which the experience fit decays.
const MIN_HALF_BAND_YEARS: f64 = 2.0;
const NEUTRAL_SALARY: f64 = 0.5;
const HYBRID_LOCATION: f64 = 0.4;

// ────────────────────────────────────────────────────────────────────────────
// Output and trait
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sub_scores: SubScores,
    /// 0 – 100
    pub total: f64,
}

/// Implement this to swap scoring backends without touching the pipeline.
pub trait MatchScorer: Send + Sync {
    fn version(&self) -> &str;

    fn score(&self, resume: &ResumeFacts, job: &JobFacts, taxonomy: &Taxonomy) -> ScoreBreakdown;
}

// ────────────────────────────────────────────────────────────────────────────
// WeightedScorer: default implementation
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub skills: f64,
    pub experience: f64,
    pub salary: f64,
    pub location: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skills: 0.55,
            experience: 0.25,
            salary: 0.10,
            location: 0.10,
        }
    }
}

/// `self_reported_score` is deliberately absent from every formula below.
#[derive(Debug, Clone)]
pub struct WeightedScorer {
    weights: ScoreWeights,
    version: String,
}

impl Default for WeightedScorer {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            version: SCORER_VERSION.to_string(),
        }
    }
}

impl WeightedScorer {
    /// Custom weights need their own version string so cached scores don't leak across.
    pub fn with_weights(weights: ScoreWeights, version: impl Into<String>) -> Self {
        Self {
            weights,
            version: version.into(),
        }
    }
}

impl MatchScorer for WeightedScorer {
    fn version(&self) -> &str {
        &self.version
    }

    fn score(&self, resume: &ResumeFacts, job: &JobFacts, taxonomy: &Taxonomy) -> ScoreBreakdown {
        let r = resume_vector(resume, taxonomy);
        let j = job_vector(job, taxonomy);

        let sub_scores = SubScores {
            skills: unit(skills_score(skill_block(&r, taxonomy), skill_block(&j, taxonomy))),
            experience: unit(experience_score(
                r[experience_index(taxonomy)],
                f64::from(job.min_experience),
                f64::from(job.max_experience),
            )),
            salary: unit(salary_score(
                (resume.salary_min, resume.salary_max),
                (job.salary_min, job.salary_max),
            )),
            location: unit(location_score(resume.location.as_deref(), job)),
        };

        let w = &self.weights;
        let total = 100.0
            * (w.skills * sub_scores.skills
                + w.experience * sub_scores.experience
                + w.salary * sub_scores.salary
                + w.location * sub_scores.location);

        ScoreBreakdown {
            sub_scores,
            total: sanitize(total).clamp(0.0, 100.0),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sub-scores
// ────────────────────────────────────────────────────────────────────────────

fn sanitize(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x
    }
}

fn unit(x: f64) -> f64 {
    sanitize(x).clamp(0.0, 1.0)
}

/// Weighted Jaccard over the job's skill support: `Σ min(rᵢ, jᵢ) / Σ jᵢ`.
///
/// The job side carries `w` for required and `w/2` for nice-to-have skills, so a
/// candidate covering every listed skill scores 1.0. Candidate skills the job
/// does not list have `jᵢ = 0` and neither help nor hurt. An empty job skill
/// set gives 0/0, which becomes 0.
pub fn skills_score(resume_skills: &[f64], job_skills: &[f64]) -> f64 {
    let overlap: f64 = resume_skills
        .iter()
        .zip(job_skills)
        .map(|(r, j)| r.min(*j))
        .sum();
    let total: f64 = job_skills.iter().sum();
    sanitize(overlap / total)
}

/// 1.0 inside `[min, max]`, decaying linearly to 0 over `max(2, (max-min)/4)` years.
pub fn experience_score(years: f64, min: f64, max: f64) -> f64 {
    let half_band = MIN_HALF_BAND_YEARS.max(0.25 * (max - min));
    let distance = if years < min {
        min - years
    } else if years > max {
        years - max
    } else {
        0.0
    };
    (1.0 - distance / half_band).max(0.0)
}

/// A side with a single bound is a point band at that bound.
fn band((lo, hi): (Option<f64>, Option<f64>)) -> Option<(f64, f64)> {
    match (lo, hi) {
        (Some(lo), Some(hi)) => Some((lo.min(hi), lo.max(hi))),
        (Some(x), None) | (None, Some(x)) => Some((x, x)),
        (None, None) => None,
    }
}

/// `overlap / min(width)`; 0.5 when either side states nothing.
pub fn salary_score(resume: (Option<f64>, Option<f64>), job: (Option<f64>, Option<f64>)) -> f64 {
    let (Some((r_lo, r_hi)), Some((j_lo, j_hi))) = (band(resume), band(job)) else {
        return NEUTRAL_SALARY;
    };

    let overlap_lo = r_lo.max(j_lo);
    let overlap_hi = r_hi.min(j_hi);
    let narrowest = (r_hi - r_lo).min(j_hi - j_lo);

    if narrowest <= 0.0 {
        // A point band either sits inside the other band or it doesn't.
        return if overlap_lo <= overlap_hi { 1.0 } else { 0.0 };
    }
    ((overlap_hi - overlap_lo).max(0.0) / narrowest).clamp(0.0, 1.0)
}

/// Same place needs a stated location on both sides; two unknowns don't match.
pub fn location_score(resume_location: Option<&str>, job: &JobFacts) -> f64 {
    if job.remote_type == RemoteType::Remote {
        return 1.0;
    }
    let same_place = match (resume_location, job.location.as_deref()) {
        (Some(r), Some(j)) => {
            let r = fold_token(r);
            !r.is_empty() && r == fold_token(j)
        }
        _ => false,
    };
    if same_place {
        1.0
    } else if job.remote_type == RemoteType::Hybrid {
        HYBRID_LOCATION
    } else {
        0.0
    }
}
