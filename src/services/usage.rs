use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, warn};

use crate::models::{Identity, UsageLimit};
use crate::redis::RedisPool;
use crate::utils::{AppError, Result};

/// Daily counters expire two days after creation, long past the day rollover
const USAGE_KEY_TTL_SECS: i64 = 172_800;

/// Counter storage for daily usage accounting.
///
/// Production runs on Redis; tests run on the in-process store so the
/// accounting rules can be exercised without a server.
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn current_count(&self, identity_key: &str, date: &str) -> Result<i64>;

    /// Atomically add one to the counter and return the new total.
    async fn increment(&self, identity_key: &str, date: &str) -> Result<i64>;
}

pub struct RedisUsageStore {
    redis: Arc<RedisPool>,
}

impl RedisUsageStore {
    pub fn new(redis: Arc<RedisPool>) -> Self {
        Self { redis }
    }

    fn usage_key(identity_key: &str, date: &str) -> String {
        format!("usage:{}:{}", identity_key, date)
    }
}

#[async_trait]
impl UsageStore for RedisUsageStore {
    async fn current_count(&self, identity_key: &str, date: &str) -> Result<i64> {
        let key = Self::usage_key(identity_key, date);
        let fields = self.redis.hgetall(&key).await?;
        match fields.get("count") {
            Some(raw) => raw.parse::<i64>().map_err(|_| {
                AppError::RedisError(format!("Corrupt usage counter at {}", key))
            }),
            None => Ok(0),
        }
    }

    async fn increment(&self, identity_key: &str, date: &str) -> Result<i64> {
        let key = Self::usage_key(identity_key, date);
        let now_timestamp = Utc::now().timestamp();

        let mut conn = self.redis.get_connection().await?;
        let mut pipe = redis::pipe();
        pipe.atomic()
            .hincr(&key, "count", 1)
            .cmd("HSETNX")
            .arg(&key)
            .arg("created_at")
            .arg(now_timestamp)
            .hset(&key, "updated_at", now_timestamp)
            .expire(&key, USAGE_KEY_TTL_SECS);

        let (count, _, _, _): (i64, i64, i64, i64) = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| AppError::RedisError(format!("Failed to record usage: {}", e)))?;

        Ok(count)
    }
}

/// In-process store used by tests and local development without Redis.
#[derive(Default)]
pub struct MemoryUsageStore {
    counters: std::sync::Mutex<HashMap<(String, String), i64>>,
}

impl MemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UsageStore for MemoryUsageStore {
    async fn current_count(&self, identity_key: &str, date: &str) -> Result<i64> {
        let counters = self
            .counters
            .lock()
            .map_err(|_| AppError::InternalError("Usage counter lock poisoned".to_string()))?;
        Ok(*counters
            .get(&(identity_key.to_string(), date.to_string()))
            .unwrap_or(&0))
    }

    async fn increment(&self, identity_key: &str, date: &str) -> Result<i64> {
        let mut counters = self
            .counters
            .lock()
            .map_err(|_| AppError::InternalError("Usage counter lock poisoned".to_string()))?;
        let entry = counters
            .entry((identity_key.to_string(), date.to_string()))
            .or_insert(0);
        *entry += 1;
        Ok(*entry)
    }
}

/// Daily usage accounting for guest translations.
///
/// Authenticated users translate without limit. Guests are counted per
/// identity per UTC day, where the identity is, in precedence order, the
/// persisted session id, then the client IP, then a shared anonymous bucket.
pub struct UsageService {
    store: Arc<dyn UsageStore>,
    daily_limit: i64,
}

impl UsageService {
    pub fn new(store: Arc<dyn UsageStore>, daily_limit: i64) -> Self {
        Self { store, daily_limit }
    }

    /// Who this request is counted against.
    ///
    /// A session only counts once it is persisted. A brand-new session
    /// created on this very request falls through to the IP, so a client
    /// cannot reset its counter by discarding cookies.
    pub fn resolve_identity(
        user_id: Option<&str>,
        session_id: Option<&str>,
        session_persisted: bool,
        ip: Option<&str>,
    ) -> Identity {
        if let Some(user_id) = user_id {
            return Identity::User(user_id.to_string());
        }
        if session_persisted {
            if let Some(session_id) = session_id {
                return Identity::Session(session_id.to_string());
            }
        }
        if let Some(ip) = ip {
            if !ip.is_empty() {
                return Identity::Ip(ip.to_string());
            }
        }
        Identity::Anonymous
    }

    pub async fn check_limit(&self, identity: &Identity) -> Result<UsageLimit> {
        self.check_limit_on(identity, &today()).await
    }

    pub async fn check_limit_on(&self, identity: &Identity, date: &str) -> Result<UsageLimit> {
        if identity.is_authenticated() {
            return Ok(UsageLimit {
                can_translate: true,
                remaining_translations: -1,
                is_authenticated: true,
                limit_message: None,
            });
        }

        // Storage failure fails closed rather than handing out free usage
        let count = self.store.current_count(&identity.key(), date).await?;
        let remaining = (self.daily_limit - count).max(0);
        debug!(
            "📊 Usage check for {}: {}/{} on {}",
            identity.key(),
            count,
            self.daily_limit,
            date
        );

        if count >= self.daily_limit {
            warn!("🚫 Daily limit reached for {}", identity.key());
            return Ok(UsageLimit {
                can_translate: false,
                remaining_translations: 0,
                is_authenticated: false,
                limit_message: Some(format!(
                    "You've reached your daily limit of {} translations. Create an account for more translations!",
                    self.daily_limit
                )),
            });
        }

        Ok(UsageLimit {
            can_translate: true,
            remaining_translations: remaining,
            is_authenticated: false,
            limit_message: Some(format!(
                "{} translations remaining today. Create an account for more access!",
                remaining
            )),
        })
    }

    /// Count one completed translation against the identity. Called only
    /// after the translation pipeline succeeds.
    pub async fn record_usage(&self, identity: &Identity) -> Result<i64> {
        self.record_usage_on(identity, &today()).await
    }

    pub async fn record_usage_on(&self, identity: &Identity, date: &str) -> Result<i64> {
        let count = self.store.increment(&identity.key(), date).await?;
        debug!("📈 Recorded usage for {}: {} on {}", identity.key(), count, date);
        Ok(count)
    }

}

fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> UsageService {
        UsageService::new(Arc::new(MemoryUsageStore::new()), 3)
    }

    #[test]
    fn test_identity_precedence() {
        let id = UsageService::resolve_identity(Some("u1"), Some("s1"), true, Some("1.2.3.4"));
        assert_eq!(id, Identity::User("u1".to_string()));

        let id = UsageService::resolve_identity(None, Some("s1"), true, Some("1.2.3.4"));
        assert_eq!(id, Identity::Session("s1".to_string()));

        let id = UsageService::resolve_identity(None, Some("s1"), false, Some("1.2.3.4"));
        assert_eq!(id, Identity::Ip("1.2.3.4".to_string()));

        let id = UsageService::resolve_identity(None, None, false, None);
        assert_eq!(id, Identity::Anonymous);
    }

    #[tokio::test]
    async fn test_authenticated_users_are_unlimited() {
        let svc = service();
        let limit = svc
            .check_limit(&Identity::User("u1".to_string()))
            .await
            .expect("check failed");
        assert!(limit.can_translate);
        assert_eq!(limit.remaining_translations, -1);
        assert!(limit.is_authenticated);
        assert!(limit.limit_message.is_none());
    }

    #[tokio::test]
    async fn test_guest_limit_exhaustion() {
        let svc = service();
        let identity = Identity::Ip("9.9.9.9".to_string());

        for expected_remaining in [3, 2, 1] {
            let limit = svc.check_limit(&identity).await.expect("check failed");
            assert!(limit.can_translate);
            assert_eq!(limit.remaining_translations, expected_remaining);
            svc.record_usage(&identity).await.expect("record failed");
        }

        let limit = svc.check_limit(&identity).await.expect("check failed");
        assert!(!limit.can_translate);
        assert_eq!(limit.remaining_translations, 0);
        assert!(limit
            .limit_message
            .as_deref()
            .expect("missing message")
            .contains("daily limit of 3"));
    }

    #[tokio::test]
    async fn test_day_rollover_resets_counter() {
        let svc = service();
        let identity = Identity::Session("s1".to_string());

        for _ in 0..3 {
            svc.record_usage_on(&identity, "2026-08-25")
                .await
                .expect("record failed");
        }
        let limit = svc
            .check_limit_on(&identity, "2026-08-25")
            .await
            .expect("check failed");
        assert!(!limit.can_translate);

        let limit = svc
            .check_limit_on(&identity, "2026-08-26")
            .await
            .expect("check failed");
        assert!(limit.can_translate);
        assert_eq!(limit.remaining_translations, 3);
    }
}
