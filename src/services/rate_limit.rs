use std::sync::Arc;

use tracing::warn;

use crate::redis::RedisPool;
use crate::utils::{AppError, Result};

/// Fixed-window request limiter keyed by scope and client.
///
/// The first hit in a window creates the counter and sets its expiry. Every
/// hit inside the window increments it; when the count passes the cap the
/// request is rejected with 429.
pub struct RateLimiter {
    redis: Arc<RedisPool>,
}

#[derive(Debug, Clone, Copy)]
pub struct RateLimitRule {
    pub window_secs: u64,
    pub max_requests: i64,
}

impl RateLimiter {
    pub fn new(redis: Arc<RedisPool>) -> Self {
        Self { redis }
    }

    fn limit_key(scope: &str, client: &str) -> String {
        format!("ratelimit:{}:{}", scope, client)
    }

    pub async fn check(
        &self,
        scope: &str,
        client: &str,
        rule: RateLimitRule,
        message: &str,
    ) -> Result<()> {
        let key = Self::limit_key(scope, client);
        let count = self.redis.incr(&key).await?;
        if count == 1 {
            self.redis.expire(&key, rule.window_secs as i64).await?;
        }
        if count > rule.max_requests {
            warn!("🚦 Rate limit hit: scope={} client={}", scope, client);
            return Err(AppError::RateLimitExceeded(message.to_string()));
        }
        Ok(())
    }
}
