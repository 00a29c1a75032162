//! Skills Taxonomy: curated mapping from free-text skill tokens to canonical ids.
//!
//! A `Taxonomy` is an immutable snapshot stamped with a version. Hot reloads go
//! through `TaxonomyRegistry::publish`, which installs a new snapshot with the
//! next version; readers keep whatever `Arc<Taxonomy>` they started with.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

pub mod loader;
pub mod registry;

pub use registry::TaxonomyRegistry;

/// Weight used when a skill row carries no explicit importance.
pub const DEFAULT_WEIGHT: f64 = 1.0;
const MAX_WEIGHT: f64 = 5.0;

/// Characters stripped from both ends of a token before the second lookup.
/// `+`, `#` and a leading `.` are left alone on the first lookup so that
/// "c++", "c#" and ".net" resolve.
const TRIM_PUNCTUATION: &[char] = &[
    '.', ',', ';', ':', '!', '?', '(', ')', '[', ']', '{', '}', '"', '\'', '*', '•', '·', '-',
    '–', '—', '/', '\\', '|',
];

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TaxonomyError {
    #[error("alias '{alias}' maps to both '{first}' and '{second}'")]
    Conflict {
        alias: String,
        first: String,
        second: String,
    },

    #[error("skill '{canonical_id}' has importance weight {weight}; expected (0, 5]")]
    InvalidWeight { canonical_id: String, weight: f64 },

    #[error("skill row has an empty canonical id")]
    EmptyId,

    #[error("failed to read taxonomy source: {0}")]
    Source(String),
}

/// One skill row as delivered by the taxonomy source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillRow {
    pub canonical_id: String,
    pub display_name: String,
    pub category: String,
    #[serde(default)]
    pub importance_weight: Option<f64>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillEntry {
    pub canonical_id: String,
    pub display_name: String,
    pub category: String,
    pub importance_weight: f64,
    pub aliases: BTreeSet<String>,
}

#[derive(Debug, Clone)]
pub struct Taxonomy {
    version: u64,
    entries: BTreeMap<String, SkillEntry>,
    alias_index: HashMap<String, String>,
    /// Position of each canonical id in vector coordinate order.
    positions: HashMap<String, usize>,
}

impl Taxonomy {
    /// Builds a snapshot, rejecting ambiguous aliases and out-of-range weights.
    pub fn build(version: u64, rows: Vec<SkillRow>) -> Result<Self, TaxonomyError> {
        let mut entries: BTreeMap<String, SkillEntry> = BTreeMap::new();
        let mut alias_index: HashMap<String, String> = HashMap::new();

        for row in rows {
            let canonical_id = row.canonical_id.trim().to_string();
            if canonical_id.is_empty() {
                return Err(TaxonomyError::EmptyId);
            }

            let importance_weight = match row.importance_weight {
                None => DEFAULT_WEIGHT,
                Some(w) if w.is_finite() && w > 0.0 && w <= MAX_WEIGHT => w,
                Some(w) => {
                    return Err(TaxonomyError::InvalidWeight {
                        canonical_id,
                        weight: w,
                    })
                }
            };

            let mut surface_forms: Vec<&str> =
                vec![canonical_id.as_str(), row.display_name.as_str()];
            surface_forms.extend(row.aliases.iter().map(String::as_str));

            let mut aliases = BTreeSet::new();
            for form in surface_forms {
                let folded = fold_token(form);
                if folded.is_empty() {
                    continue;
                }
                if let Some(existing) = alias_index.get(&folded) {
                    if existing != &canonical_id {
                        return Err(TaxonomyError::Conflict {
                            alias: folded,
                            first: existing.clone(),
                            second: canonical_id.clone(),
                        });
                    }
                }
                alias_index.insert(folded.clone(), canonical_id.clone());
                aliases.insert(folded);
            }

            if entries.contains_key(&canonical_id) {
                return Err(TaxonomyError::Conflict {
                    alias: canonical_id.clone(),
                    first: canonical_id.clone(),
                    second: canonical_id,
                });
            }

            entries.insert(
                canonical_id.clone(),
                SkillEntry {
                    canonical_id,
                    display_name: row.display_name.trim().to_string(),
                    category: row.category.trim().to_string(),
                    importance_weight,
                    aliases,
                },
            );
        }

        let positions = entries
            .keys()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Ok(Self {
            version,
            entries,
            alias_index,
            positions,
        })
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-folded, punctuation-trimmed alias lookup.
    pub fn canonicalize(&self, token: &str) -> Option<&str> {
        let folded = fold_token(token);
        if folded.is_empty() {
            return None;
        }
        if let Some(id) = self.alias_index.get(&folded) {
            return Some(id.as_str());
        }
        let trimmed = folded.trim_matches(TRIM_PUNCTUATION).trim();
        if trimmed.is_empty() || trimmed == folded {
            return None;
        }
        self.alias_index.get(trimmed).map(String::as_str)
    }

    /// Importance weight; unknown ids get the default.
    pub fn weight(&self, canonical_id: &str) -> f64 {
        self.entries
            .get(canonical_id)
            .map(|e| e.importance_weight)
            .unwrap_or(DEFAULT_WEIGHT)
    }

    pub fn category(&self, canonical_id: &str) -> Option<&str> {
        self.entries.get(canonical_id).map(|e| e.category.as_str())
    }

    pub fn entry(&self, canonical_id: &str) -> Option<&SkillEntry> {
        self.entries.get(canonical_id)
    }

    /// Coordinate of a canonical id in the skill block of a feature vector.
    pub fn position(&self, canonical_id: &str) -> Option<usize> {
        self.positions.get(canonical_id).copied()
    }

    /// Canonical ids in coordinate order.
    pub fn skill_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

/// NFKC, lower-case, inner whitespace collapsed.
pub fn fold_token(token: &str) -> String {
    let normalized: String = token.nfkc().collect::<String>().to_lowercase();
    normalized.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
pub(crate) fn sample_rows() -> Vec<SkillRow> {
    let row = |id: &str, name: &str, category: &str, weight: Option<f64>, aliases: &[&str]| {
        SkillRow {
            canonical_id: id.to_string(),
            display_name: name.to_string(),
            category: category.to_string(),
            importance_weight: weight,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    };
    vec![
        row("skill:python", "Python", "language", None, &["py", "python3"]),
        row("skill:sql", "SQL", "data", None, &["postgres sql"]),
        row("skill:docker", "Docker", "devops", None, &["docker container"]),
        row("skill:javascript", "JavaScript", "language", None, &["js", "ecmascript", "es6"]),
        row("skill:cplusplus", "C++", "language", Some(1.5), &["cpp"]),
        row("skill:csharp", "C#", "language", None, &[".net", "dotnet"]),
        row("skill:kubernetes", "Kubernetes", "devops", Some(2.0), &["k8s"]),
        row("skill:rust", "Rust", "language", Some(3.0), &["rust lang"]),
    ]
}

#[cfg(test)]
pub(crate) fn sample_taxonomy() -> Taxonomy {
    Taxonomy::build(1, sample_rows()).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_is_case_folded() {
        let t = sample_taxonomy();
        assert_eq!(t.canonicalize("Python"), Some("skill:python"));
        assert_eq!(t.canonicalize("  PY "), Some("skill:python"));
        assert_eq!(t.canonicalize("JS"), Some("skill:javascript"));
    }

    #[test]
    fn test_canonicalize_trims_punctuation() {
        let t = sample_taxonomy();
        assert_eq!(t.canonicalize("Docker,"), Some("skill:docker"));
        assert_eq!(t.canonicalize("(Kubernetes)"), Some("skill:kubernetes"));
        assert_eq!(t.canonicalize("• rust lang;"), Some("skill:rust"));
    }

    #[test]
    fn test_canonicalize_keeps_symbolic_names() {
        let t = sample_taxonomy();
        assert_eq!(t.canonicalize("C++"), Some("skill:cplusplus"));
        assert_eq!(t.canonicalize("c#"), Some("skill:csharp"));
        assert_eq!(t.canonicalize(".NET"), Some("skill:csharp"));
    }

    #[test]
    fn test_canonical_ids_resolve_to_themselves() {
        let t = sample_taxonomy();
        for id in t.skill_ids() {
            assert_eq!(t.canonicalize(id), Some(id));
        }
    }

    #[test]
    fn test_unknown_token_is_none() {
        let t = sample_taxonomy();
        assert_eq!(t.canonicalize("cobol"), None);
        assert_eq!(t.canonicalize("   "), None);
        assert_eq!(t.canonicalize("..."), None);
    }

    #[test]
    fn test_fullwidth_input_is_folded() {
        let t = sample_taxonomy();
        assert_eq!(t.canonicalize("ＰＹＴＨＯＮ"), Some("skill:python"));
    }

    #[test]
    fn test_weight_defaults_to_one() {
        let t = sample_taxonomy();
        assert_eq!(t.weight("skill:python"), 1.0);
        assert_eq!(t.weight("skill:rust"), 3.0);
        assert_eq!(t.weight("skill:unknown"), DEFAULT_WEIGHT);
    }

    #[test]
    fn test_category_lookup() {
        let t = sample_taxonomy();
        assert_eq!(t.category("skill:docker"), Some("devops"));
        assert_eq!(t.category("skill:nope"), None);
    }

    #[test]
    fn test_ambiguous_alias_is_rejected() {
        let mut rows = sample_rows();
        rows.push(SkillRow {
            canonical_id: "skill:java".to_string(),
            display_name: "Java".to_string(),
            category: "language".to_string(),
            importance_weight: None,
            aliases: vec!["JS".to_string()],
        });
        let err = Taxonomy::build(1, rows).unwrap_err();
        assert_eq!(
            err,
            TaxonomyError::Conflict {
                alias: "js".to_string(),
                first: "skill:javascript".to_string(),
                second: "skill:java".to_string(),
            }
        );
    }

    #[test]
    fn test_out_of_range_weight_is_rejected() {
        let mut rows = sample_rows();
        rows[0].importance_weight = Some(0.0);
        assert!(matches!(
            Taxonomy::build(1, rows.clone()),
            Err(TaxonomyError::InvalidWeight { .. })
        ));
        rows[0].importance_weight = Some(5.5);
        assert!(matches!(
            Taxonomy::build(1, rows),
            Err(TaxonomyError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn test_positions_follow_sorted_ids() {
        let t = sample_taxonomy();
        let ids: Vec<&str> = t.skill_ids().collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
        for (i, id) in ids.iter().enumerate() {
            assert_eq!(t.position(id), Some(i));
        }
    }
}
