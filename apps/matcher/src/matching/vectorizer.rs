//! Vectorizer: interpretable feature vectors for résumés and jobs.
//!
//! Layout for a taxonomy with `n` skills:
//!
//! | range            | meaning                                         |
//! |------------------|-------------------------------------------------|
//! | `0..n`           | one coordinate per canonical skill, taxonomy order |
//! | `n`              | years of experience                             |
//! | `n + 1`          | education ordinal 0..=4                         |
//! | `n + 2..`        | one coordinate per recognised language tag      |
//!
//! Pure: same taxonomy version and inputs give bit-identical vectors.

use crate::models::job::JobFacts;
use crate::models::language::{language_index, RECOGNIZED_LANGUAGES};
use crate::models::resume::ResumeFacts;
use crate::taxonomy::Taxonomy;

/// Share of the importance weight a nice-to-have skill carries on the job side.
pub const NICE_TO_HAVE_FACTOR: f64 = 0.5;

pub fn dimension(taxonomy: &Taxonomy) -> usize {
    taxonomy.len() + 2 + RECOGNIZED_LANGUAGES.len()
}

pub fn experience_index(taxonomy: &Taxonomy) -> usize {
    taxonomy.len()
}

pub fn education_index(taxonomy: &Taxonomy) -> usize {
    taxonomy.len() + 1
}

fn language_offset(taxonomy: &Taxonomy) -> usize {
    taxonomy.len() + 2
}

/// The skill block of a vector built against `taxonomy`.
pub fn skill_block<'v>(vector: &'v [f64], taxonomy: &Taxonomy) -> &'v [f64] {
    &vector[..taxonomy.len()]
}

pub fn resume_vector(facts: &ResumeFacts, taxonomy: &Taxonomy) -> Vec<f64> {
    let mut v = vec![0.0; dimension(taxonomy)];

    // Ids from an older taxonomy snapshot may be gone; they simply have no coordinate.
    for skill in &facts.skills {
        if let Some(pos) = taxonomy.position(skill) {
            v[pos] = taxonomy.weight(skill);
        }
    }
    v[experience_index(taxonomy)] = facts.years_experience;
    v[education_index(taxonomy)] = f64::from(facts.education_level.ordinal());

    let offset = language_offset(taxonomy);
    for tag in &facts.languages {
        if let Some(i) = language_index(tag) {
            v[offset + i] = 1.0;
        }
    }
    v
}

/// Required skills carry their full weight, nice-to-have skills half of it.
/// The experience coordinate is the band midpoint; jobs carry no education or
/// language requirements.
pub fn job_vector(facts: &JobFacts, taxonomy: &Taxonomy) -> Vec<f64> {
    let mut v = vec![0.0; dimension(taxonomy)];

    for skill in &facts.nice_to_have_skills {
        if let Some(pos) = taxonomy.position(skill) {
            v[pos] = NICE_TO_HAVE_FACTOR * taxonomy.weight(skill);
        }
    }
    for skill in &facts.required_skills {
        if let Some(pos) = taxonomy.position(skill) {
            v[pos] = taxonomy.weight(skill);
        }
    }
    v[experience_index(taxonomy)] =
        (f64::from(facts.min_experience) + f64::from(facts.max_experience)) / 2.0;
    v
}
