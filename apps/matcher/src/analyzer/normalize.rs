//! Post-processing of raw model output into `ResumeFacts`.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use super::schema::RawResumeFacts;
use crate::models::language::normalize_language_tag;
use crate::models::resume::{EducationLevel, ResumeFacts, MAX_SUMMARY_CHARS, MAX_YEARS_EXPERIENCE};
use crate::taxonomy::Taxonomy;

// Local part per RFC 5322 dot-atom; domain labels may carry Unicode letters;
// TLD is alphabetic (any script) or an IDN `xn--` label.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[A-Za-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[\p{L}\p{N}](?:[\p{L}\p{N}-]{0,61}[\p{L}\p{N}])?\.)+(?:\p{L}{2,63}|xn--[A-Za-z0-9-]{2,59})$",
    )
    .unwrap()
});

pub fn is_valid_email(candidate: &str) -> bool {
    candidate.len() <= 254 && EMAIL_RE.is_match(candidate)
}

/// Clamps into [0, 60]; NaN and infinities become 0.
pub fn clamp_years(years: f64) -> f64 {
    if years.is_finite() {
        years.clamp(0.0, MAX_YEARS_EXPERIENCE)
    } else {
        0.0
    }
}

/// Keeps at most `max` characters, cutting on a char boundary.
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Keeps whole paragraphs while the total stays within `max_chars`.
/// A first paragraph longer than the budget is cut at the character limit.
pub fn truncate_at_paragraph(text: &str, max_chars: usize) -> &str {
    if text.chars().count() <= max_chars {
        return text;
    }

    let mut end = 0;
    let mut used = 0;
    for (offset, paragraph) in paragraph_spans(text) {
        let cost = paragraph.chars().count() + usize::from(end > 0);
        if used + cost > max_chars {
            break;
        }
        used += cost;
        end = offset + paragraph.len();
    }

    if end == 0 {
        let cut = text
            .char_indices()
            .nth(max_chars)
            .map(|(i, _)| i)
            .unwrap_or(text.len());
        return &text[..cut];
    }
    &text[..end]
}

fn paragraph_spans(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |p| {
        let start = offset;
        offset += p.len() + 1;
        (start, p)
    })
}

fn clean_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn clean_salary(min: Option<f64>, max: Option<f64>) -> (Option<f64>, Option<f64>) {
    let keep = |v: Option<f64>| v.filter(|x| x.is_finite() && *x >= 0.0);
    match (keep(min), keep(max)) {
        (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
        other => other,
    }
}

/// Builds the final fact sheet. Skills resolve through the taxonomy; anything
/// unresolved lands in `unknown_skills` verbatim (trimmed).
pub fn into_facts(raw: RawResumeFacts, id: Uuid, taxonomy: &Taxonomy) -> ResumeFacts {
    let mut skills = BTreeSet::new();
    let mut unknown_skills = BTreeSet::new();
    for token in raw.skills {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        match taxonomy.canonicalize(token) {
            Some(canonical) => {
                skills.insert(canonical.to_string());
            }
            None => {
                unknown_skills.insert(token.to_string());
            }
        }
    }

    let languages = raw
        .languages
        .iter()
        .filter_map(|l| normalize_language_tag(l))
        .map(str::to_string)
        .collect();

    let email = clean_optional(raw.email).filter(|e| is_valid_email(e));
    let (salary_min, salary_max) = clean_salary(raw.salary_min, raw.salary_max);

    let self_reported_score = raw
        .self_reported_score
        .filter(|s| s.is_finite())
        .map(|s| s.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0);

    ResumeFacts {
        id,
        name: clean_optional(raw.name),
        email,
        phone: clean_optional(raw.phone),
        skills,
        unknown_skills,
        years_experience: clamp_years(raw.years_experience.unwrap_or(0.0)),
        education_level: raw
            .education_level
            .as_deref()
            .and_then(EducationLevel::parse_loose)
            .unwrap_or_default(),
        languages,
        self_reported_score,
        summary: truncate_chars(raw.summary.as_deref().unwrap_or("").trim(), MAX_SUMMARY_CHARS),
        location: clean_optional(raw.location),
        salary_min,
        salary_max,
    }
}
