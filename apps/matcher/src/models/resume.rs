use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on `years_experience`.
pub const MAX_YEARS_EXPERIENCE: f64 = 60.0;
/// Upper bound on `summary`, in characters.
pub const MAX_SUMMARY_CHARS: usize = 500;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    #[default]
    None,
    Secondary,
    Bachelor,
    Master,
    Doctorate,
}

impl EducationLevel {
    /// Ordinal used by the vectorizer: none=0 … doctorate=4.
    pub fn ordinal(self) -> u8 {
        match self {
            EducationLevel::None => 0,
            EducationLevel::Secondary => 1,
            EducationLevel::Bachelor => 2,
            EducationLevel::Master => 3,
            EducationLevel::Doctorate => 4,
        }
    }

    /// Maps the loose wording models and résumés use onto a level.
    pub fn parse_loose(raw: &str) -> Option<Self> {
        let folded = raw.trim().to_lowercase();
        let level = match folded.as_str() {
            "" | "none" | "no degree" | "n/a" => EducationLevel::None,
            "secondary" | "high school" | "highschool" | "school" | "ged" | "vocational"
            | "college" => EducationLevel::Secondary,
            "bachelor" | "bachelors" | "bachelor's" | "ba" | "bs" | "bsc" | "b.sc." | "undergraduate"
            | "specialist" => EducationLevel::Bachelor,
            "master" | "masters" | "master's" | "ma" | "ms" | "msc" | "m.sc." | "mba" => {
                EducationLevel::Master
            }
            "doctorate" | "doctoral" | "phd" | "ph.d." | "dphil" | "candidate of sciences" => {
                EducationLevel::Doctorate
            }
            _ => return None,
        };
        Some(level)
    }
}

/// Structured facts extracted from one résumé document.
///
/// Created once by the analyzer and never mutated afterwards; a new upload
/// produces a new résumé version and a fresh set of facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResumeFacts {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    /// Canonical skill identifiers.
    pub skills: BTreeSet<String>,
    /// Skill strings the taxonomy did not recognise, verbatim. Never vectorized.
    #[serde(default)]
    pub unknown_skills: BTreeSet<String>,
    pub years_experience: f64,
    pub education_level: EducationLevel,
    /// ISO 639-1 primary tags.
    pub languages: BTreeSet<String>,
    /// Advisory only. Does not take part in match scoring.
    pub self_reported_score: u8,
    pub summary: String,
    #[serde(default)]
    pub location: Option<String>,
    /// Expected salary band, same currency as job listings.
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
}

impl ResumeFacts {
    /// An empty fact sheet, mostly useful as a base for builders in tests.
    pub fn empty(id: Uuid) -> Self {
        Self {
            id,
            name: None,
            email: None,
            phone: None,
            skills: BTreeSet::new(),
            unknown_skills: BTreeSet::new(),
            years_experience: 0.0,
            education_level: EducationLevel::None,
            languages: BTreeSet::new(),
            self_reported_score: 0,
            summary: String::new(),
            location: None,
            salary_min: None,
            salary_max: None,
        }
    }
}
