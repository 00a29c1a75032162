use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use tracing::{info, warn};

use crate::models::match_record::MatchRecord;

const KEY_PREFIX: &str = "match:";

/// Second cache tier shared across restarts. Failures here never fail a
/// match: reads degrade to a miss and writes are dropped with a warning.
#[async_trait]
pub trait DurableCache: Send + Sync {
    async fn get(&self, fingerprint: &str) -> Option<MatchRecord>;

    async fn put(&self, fingerprint: &str, record: &MatchRecord, ttl: chrono::Duration);
}

/// Redis-backed tier: JSON values under `match:<fingerprint>`, expired by `EX`.
pub struct RedisCache {
    conn: MultiplexedConnection,
}

impl RedisCache {
    pub async fn connect(url: &str) -> redis::RedisResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        info!("Redis cache tier connected");
        Ok(Self { conn })
    }
}

#[async_trait]
impl DurableCache for RedisCache {
    async fn get(&self, fingerprint: &str) -> Option<MatchRecord> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = match redis::cmd("GET")
            .arg(format!("{KEY_PREFIX}{fingerprint}"))
            .query_async::<_, Option<String>>(&mut conn)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!(fingerprint, error = %e, "Redis GET failed; treating as miss");
                return None;
            }
        };

        match serde_json::from_str(&raw?) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!(fingerprint, error = %e, "Discarding undecodable cached match");
                None
            }
        }
    }

    async fn put(&self, fingerprint: &str, record: &MatchRecord, ttl: chrono::Duration) {
        let payload = match serde_json::to_string(record) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(fingerprint, error = %e, "Could not encode match for Redis");
                return;
            }
        };

        let mut conn = self.conn.clone();
        let result = redis::cmd("SET")
            .arg(format!("{KEY_PREFIX}{fingerprint}"))
            .arg(payload)
            .arg("EX")
            .arg(ttl.num_seconds().max(1))
            .query_async::<_, ()>(&mut conn)
            .await;
        if let Err(e) = result {
            warn!(fingerprint, error = %e, "Redis SET failed; match cached locally only");
        }
    }
}
