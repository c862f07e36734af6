//! Redis-backed resume and job document store.
//!
//! Layout per document kind:
//! - `{prefix}:{kind}:{id}` hash, field `data` holds the JSON document
//! - `{prefix}:{kind}s:all` sorted set of ids scored by last upsert time

use async_trait::async_trait;
use redis::AsyncCommands;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use skillgraph_core::record::RecordStore;
use skillgraph_core::{JobRecord, ResumeRecord, SkillGraphResult};

use crate::client::{init_pool, RedisPool, RedisResult};

const DEFAULT_PREFIX: &str = "skillgraph";
const RESUME: &str = "resume";
const JOB: &str = "job";

fn document_key(prefix: &str, kind: &str, id: &str) -> String {
    format!("{}:{}:{}", prefix, kind, id)
}

fn index_key(prefix: &str, kind: &str) -> String {
    format!("{}:{}s:all", prefix, kind)
}

/// Canonical document store on Redis.
#[derive(Clone)]
pub struct RedisRecordStore {
    pool: RedisPool,
    prefix: String,
}

impl RedisRecordStore {
    /// Connect to Redis and return a ready store.
    pub async fn open(redis_url: &str) -> RedisResult<Self> {
        let pool = init_pool(redis_url).await?;
        info!(url = redis_url, "Connected record store");
        Ok(Self::with_pool(pool))
    }

    /// Wrap an existing pool.
    pub fn with_pool(pool: RedisPool) -> Self {
        Self {
            pool,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }

    /// Consume the store. Equivalent to dropping it: the connection
    /// manager disconnects once its last clone is gone.
    pub fn close(self) {
        debug!(prefix = %self.prefix, "Record store closed");
    }

    async fn put<T: Serialize>(&self, kind: &str, id: &str, doc: &T) -> RedisResult<()> {
        let mut conn = self.pool.clone();
        let key = document_key(&self.prefix, kind, id);
        conn.hset::<_, _, _, ()>(&key, "data", serde_json::to_string(doc)?).await?;

        let zkey = index_key(&self.prefix, kind);
        conn.zadd::<_, _, _, ()>(&zkey, id, chrono::Utc::now().timestamp()).await?;
        Ok(())
    }

    async fn get<T: DeserializeOwned>(&self, kind: &str, id: &str) -> RedisResult<Option<T>> {
        let mut conn = self.pool.clone();
        let key = document_key(&self.prefix, kind, id);
        let json: Option<String> = conn.hget(&key, "data").await?;
        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    async fn remove(&self, kind: &str, id: &str) -> RedisResult<bool> {
        let mut conn = self.pool.clone();
        let key = document_key(&self.prefix, kind, id);
        let removed: i64 = conn.del(&key).await?;

        let zkey = index_key(&self.prefix, kind);
        conn.zrem::<_, _, ()>(&zkey, id).await?;
        Ok(removed > 0)
    }

    async fn list<T: DeserializeOwned>(&self, kind: &str) -> RedisResult<Vec<T>> {
        let mut conn = self.pool.clone();
        let zkey = index_key(&self.prefix, kind);
        let ids: Vec<String> = conn.zrange(&zkey, 0, -1).await?;

        let mut docs = Vec::with_capacity(ids.len());
        for id in ids {
            let key = document_key(&self.prefix, kind, &id);
            let json: Option<String> = conn.hget(&key, "data").await?;
            if let Some(j) = json {
                match serde_json::from_str::<T>(&j) {
                    Ok(doc) => docs.push(doc),
                    Err(e) => warn!(kind, id = %id, error = %e, "Skipping undecodable document"),
                }
            }
        }
        Ok(docs)
    }
}

#[async_trait]
impl RecordStore for RedisRecordStore {
    async fn upsert_resume(&self, record: &ResumeRecord) -> SkillGraphResult<()> {
        Ok(self.put(RESUME, &record.id, record).await?)
    }

    async fn find_resume(&self, id: &str) -> SkillGraphResult<Option<ResumeRecord>> {
        Ok(self.get(RESUME, id).await?)
    }

    async fn delete_resume(&self, id: &str) -> SkillGraphResult<bool> {
        Ok(self.remove(RESUME, id).await?)
    }

    async fn list_resumes(&self) -> SkillGraphResult<Vec<ResumeRecord>> {
        Ok(self.list(RESUME).await?)
    }

    async fn upsert_job(&self, record: &JobRecord) -> SkillGraphResult<()> {
        Ok(self.put(JOB, &record.id, record).await?)
    }

    async fn find_job(&self, id: &str) -> SkillGraphResult<Option<JobRecord>> {
        Ok(self.get(JOB, id).await?)
    }

    async fn delete_job(&self, id: &str) -> SkillGraphResult<bool> {
        Ok(self.remove(JOB, id).await?)
    }

    async fn list_jobs(&self) -> SkillGraphResult<Vec<JobRecord>> {
        Ok(self.list(JOB).await?)
    }
}
