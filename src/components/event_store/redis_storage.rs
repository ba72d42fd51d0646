use super::storage::EventStorage;
use crate::error::{storage_error, AppResult};
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use tracing::{debug, info};

/// Redis storage holding the snapshot under one key
pub struct RedisStorage {
    client: RedisClient,
    key: String,
}

impl RedisStorage {
    /// Create a client; the connection is opened lazily on first use
    pub fn new(redis_url: &str, key: &str) -> AppResult<Self> {
        info!("Using Redis at {} (key {})", redis_url, key);

        let client = RedisClient::open(redis_url)
            .map_err(|e| storage_error(&format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client,
            key: key.to_string(),
        })
    }

    /// Get a Redis connection from the client
    async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| storage_error(&format!("Failed to connect to Redis: {}", e)))
    }
}

#[async_trait]
impl EventStorage for RedisStorage {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn load(&self) -> AppResult<Option<String>> {
        let mut conn = self.get_connection().await?;

        let data: Option<String> = conn
            .get(&self.key)
            .await
            .map_err(|e| storage_error(&format!("Redis GET error: {}", e)))?;

        Ok(data)
    }

    async fn save(&self, snapshot: &str) -> AppResult<()> {
        let mut conn = self.get_connection().await?;

        conn.set::<_, _, ()>(&self.key, snapshot)
            .await
            .map_err(|e| storage_error(&format!("Redis SET error: {}", e)))?;

        debug!("Stored {} bytes under {}", snapshot.len(), self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(RedisStorage::new("not a redis url", "calendarJobs").is_err());
    }

    /// Needs a Redis server on localhost
    #[tokio::test]
    #[ignore]
    async fn test_round_trip_against_local_redis() {
        let storage = RedisStorage::new("redis://127.0.0.1:6379", "promptcal_test_events").unwrap();
        storage.save("[]").await.unwrap();
        assert_eq!(storage.load().await.unwrap(), Some("[]".to_string()));
    }
}
