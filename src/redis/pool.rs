use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;

use crate::config::Settings;
use crate::utils::{AppError, Result};

/// Redis connection pool wrapper
#[derive(Clone)]
pub struct RedisPool {
    pool: Pool,
}

impl RedisPool {
    /// Create a new Redis connection pool
    pub fn new(settings: &Settings) -> Result<Self> {
        let redis_url = settings.redis_url();

        let cfg = Config::from_url(redis_url);
        let pool = cfg
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|e| AppError::RedisError(format!("Failed to create Redis pool: {}", e)))?;

        Ok(Self { pool })
    }

    /// Get a connection from the pool
    pub async fn get_connection(&self) -> Result<Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to get Redis connection: {}", e)))
    }

    /// Ping Redis to check connectivity
    pub async fn ping(&self) -> Result<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::RedisError(format!("Redis ping failed: {}", e)))?;
        Ok(())
    }

    /// Get a value from Redis
    pub async fn get<T: redis::FromRedisValue>(&self, key: &str) -> Result<Option<T>> {
        let mut conn = self.get_connection().await?;
        conn.get(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to get key '{}': {}", key, e)))
    }

    /// Set a value in Redis
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.set(key, value)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to set key '{}': {}", key, e)))
    }

    /// Set a value with expiration
    pub async fn setex(&self, key: &str, value: &str, seconds: u64) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.set_ex(key, value, seconds)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to setex key '{}': {}", key, e)))
    }

    /// Delete a key
    pub async fn del(&self, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.del(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to delete key '{}': {}", key, e)))
    }

    /// Check if a key exists
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        conn.exists(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to check key '{}': {}", key, e)))
    }

    /// Set expiration on a key
    pub async fn expire(&self, key: &str, seconds: i64) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        conn.expire(key, seconds)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to expire key '{}': {}", key, e)))
    }

    /// Increment a counter
    pub async fn incr(&self, key: &str) -> Result<i64> {
        let mut conn = self.get_connection().await?;
        conn.incr(key, 1)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to increment key '{}': {}", key, e)))
    }

    /// Get all hash fields and values
    pub async fn hgetall(&self, key: &str) -> Result<std::collections::HashMap<String, String>> {
        let mut conn = self.get_connection().await?;
        conn.hgetall(key)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to hgetall for '{}': {}", key, e)))
    }

    /// Add member to a sorted set
    pub async fn zadd(&self, key: &str, score: f64, member: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.zadd(key, member, score)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to zadd to '{}': {}", key, e)))
    }

    /// Remove member from a sorted set
    pub async fn zrem(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;
        conn.zrem(key, member)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to zrem from '{}': {}", key, e)))
    }

    /// Get sorted set members by descending score (newest first for timestamp scores)
    pub async fn zrevrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<String>> {
        let mut conn = self.get_connection().await?;
        conn.zrevrange(key, start, stop)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to zrevrange for '{}': {}", key, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Note: These tests require a running Redis instance
    // You can skip them with: cargo test -- --skip redis

    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn test_redis_ping() {
        let settings = Settings::new().expect("Failed to load settings");
        let pool = RedisPool::new(&settings).expect("Failed to create Redis pool");

        let result = pool.ping().await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_set_get() {
        let settings = Settings::new().expect("Failed to load settings");
        let pool = RedisPool::new(&settings).expect("Failed to create Redis pool");

        let test_key = "test:voicebridge:key";
        let test_value = "test_value";

        pool.set(test_key, test_value).await.expect("Failed to set");

        let result: Option<String> = pool.get(test_key).await.expect("Failed to get");
        assert_eq!(result, Some(test_value.to_string()));

        pool.del(test_key).await.expect("Failed to delete");
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis_sorted_set_roundtrip() {
        let settings = Settings::new().expect("Failed to load settings");
        let pool = RedisPool::new(&settings).expect("Failed to create Redis pool");

        let key = "test:voicebridge:zset";
        pool.zadd(key, 1.0, "older").await.expect("zadd failed");
        pool.zadd(key, 2.0, "newer").await.expect("zadd failed");

        let members = pool.zrevrange(key, 0, -1).await.expect("zrevrange failed");
        assert_eq!(members, vec!["newer".to_string(), "older".to_string()]);

        pool.zrem(key, "older").await.expect("zrem failed");
        pool.del(key).await.expect("del failed");
    }
}
