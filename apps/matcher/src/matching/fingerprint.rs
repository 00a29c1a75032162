use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Everything a cached score depends on. Any change to any field is a new key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub resume_id: Uuid,
    pub resume_version: i32,
    pub job_id: Uuid,
    pub job_version: i32,
    pub taxonomy_version: u64,
    pub scorer_version: String,
}

impl CacheKey {
    /// Stable SHA-256 hex digest of the key fields.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(
            format!(
                "resume={}@{}|job={}@{}|taxonomy={}|scorer={}",
                self.resume_id,
                self.resume_version,
                self.job_id,
                self.job_version,
                self.taxonomy_version,
                self.scorer_version
            )
            .as_bytes(),
        );
        hex::encode(hasher.finalize())
    }

    /// Short form for logs.
    pub fn subject(&self) -> String {
        format!("resume {} / job {}", self.resume_id, self.job_id)
    }
}
