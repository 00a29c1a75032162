// Analyzer and interview generator prompt templates.
// Deployments may swap either set (different wording or language) without code changes.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::llm_client::prompts::JSON_ONLY_SYSTEM;

static SLOT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{(\w+)\}").unwrap());

/// A system prompt plus a user template with `{placeholder}` slots.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSet {
    pub system: String,
    pub template: String,
}

impl PromptSet {
    pub fn new(system: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            template: template.into(),
        }
    }

    /// Fills `{key}` slots in one pass over the template, so slot syntax inside
    /// an inserted value stays literal. Unknown slots are left as-is.
    pub fn render(&self, values: &[(&str, &str)]) -> String {
        SLOT_RE
            .replace_all(&self.template, |caps: &Captures| {
                values
                    .iter()
                    .find(|(key, _)| *key == &caps[1])
                    .map_or_else(|| caps[0].to_string(), |(_, value)| value.to_string())
            })
            .into_owned()
    }

    pub fn resume_default() -> Self {
        Self::new(
            format!("{RESUME_SYSTEM} {JSON_ONLY_SYSTEM}"),
            RESUME_PROMPT,
        )
    }

    pub fn interview_default() -> Self {
        Self::new(
            format!("{INTERVIEW_SYSTEM} {JSON_ONLY_SYSTEM}"),
            INTERVIEW_PROMPT,
        )
    }
}

pub const RESUME_SYSTEM: &str = "\
You are a precise résumé data extractor for a recruiting platform. \
Extract only facts that are stated in the résumé. \
Never guess contact details; use null when a value is absent.";

pub const RESUME_PROMPT: &str = r#"Extract the candidate facts from the résumé below.

RÉSUMÉ:
{resume_text}

OUTPUT SCHEMA (return exactly this structure, every key present):
{
  "name": "string" | null,
  "email": "string" | null,
  "phone": "string" | null,
  "skills": ["string"],
  "years_experience": number | null,
  "education_level": "none" | "secondary" | "bachelor" | "master" | "doctorate" | null,
  "languages": ["string"],
  "self_reported_score": number | null,
  "summary": "string" | null,
  "location": "string" | null,
  "salary_min": number | null,
  "salary_max": number | null
}

RULES:
- "skills": one entry per technology, tool or discipline, as written in the résumé.
- "years_experience": total professional experience in years.
- "languages": spoken languages only, not programming languages.
- "self_reported_score": 0-100 overall self-assessment if the résumé states one, else null.
- "summary": at most 500 characters.
- "salary_min"/"salary_max": expected yearly salary if stated, else null."#;

pub const INTERVIEW_SYSTEM: &str = "\
You are a senior technical interviewer. \
Write questions that probe the overlap and the gaps between a candidate and a job.";

pub const INTERVIEW_PROMPT: &str = r#"Write {count} interview questions for this candidate and job.

CANDIDATE:
{candidate}

JOB:
{job}

OUTPUT SCHEMA:
{
  "questions": [
    {"question": "string", "skill": "string", "difficulty": "basic" | "intermediate" | "advanced"}
  ]
}

RULES:
- Prefer required job skills the candidate lists; include at least one question on a missing required skill when there is one.
- "skill" is the skill the question probes, as named in the input."#;
