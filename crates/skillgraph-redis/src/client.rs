//! Redis connection handle and error mapping.

use redis::aio::ConnectionManager;
use skillgraph_core::SkillGraphError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedisError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Record encoding error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type RedisResult<T> = Result<T, RedisError>;

/// Shared connection. Cheap to clone; each operation clones its own handle.
pub type RedisPool = ConnectionManager;

/// Connect to `redis_url`, e.g. `redis://127.0.0.1:6379`.
pub async fn init_pool(redis_url: &str) -> RedisResult<RedisPool> {
    let client = redis::Client::open(redis_url)?;
    Ok(ConnectionManager::new(client).await?)
}

impl From<RedisError> for SkillGraphError {
    fn from(err: RedisError) -> Self {
        match err {
            RedisError::Connection(e) => SkillGraphError::persistence(format!("redis: {}", e)),
            RedisError::Serialization(e) => SkillGraphError::Json(e),
        }
    }
}
