use std::sync::{Arc, RwLock};

use tracing::info;

use super::{SkillRow, Taxonomy, TaxonomyError};

/// Holds the currently published taxonomy snapshot.
///
/// Scoring code calls `snapshot()` once and works against that `Arc` for the
/// rest of the computation, so a concurrent `publish` never changes the data
/// under a running score.
pub struct TaxonomyRegistry {
    current: RwLock<Arc<Taxonomy>>,
}

impl TaxonomyRegistry {
    /// Loads the initial snapshot as version 1.
    pub fn new(rows: Vec<SkillRow>) -> Result<Self, TaxonomyError> {
        let taxonomy = Taxonomy::build(1, rows)?;
        info!(
            version = taxonomy.version(),
            skills = taxonomy.len(),
            "Skills taxonomy loaded"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(taxonomy)),
        })
    }

    pub fn snapshot(&self) -> Arc<Taxonomy> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Builds and installs a new snapshot with the next version.
    /// On a build failure the current snapshot stays in place.
    pub fn publish(&self, rows: Vec<SkillRow>) -> Result<Arc<Taxonomy>, TaxonomyError> {
        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let next = Arc::new(Taxonomy::build(current.version() + 1, rows)?);
        *current = next.clone();
        info!(
            version = next.version(),
            skills = next.len(),
            "Skills taxonomy republished"
        );
        Ok(next)
    }
}
