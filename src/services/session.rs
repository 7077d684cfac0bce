use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::redis::RedisPool;
use crate::utils::{AppError, Result};

pub const SESSION_COOKIE: &str = "vb_sid";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionData {
    pub id: String,
    pub user_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new_guest() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: None,
            created_at: now,
            last_seen_at: now,
        }
    }
}

/// Cookie-backed sessions stored as JSON blobs in Redis.
pub struct SessionService {
    redis: Arc<RedisPool>,
    ttl_secs: u64,
}

impl SessionService {
    pub fn new(redis: Arc<RedisPool>, ttl_secs: u64) -> Self {
        Self { redis, ttl_secs }
    }

    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }

    fn session_key(id: &str) -> String {
        format!("sess:{}", id)
    }

    /// Load a session by id. Returns None for unknown or expired ids.
    pub async fn load(&self, id: &str) -> Result<Option<SessionData>> {
        let raw = self.redis.get::<String>(&Self::session_key(id)).await?;
        match raw {
            Some(json) => {
                let session: SessionData = serde_json::from_str(&json).map_err(|e| {
                    AppError::RedisError(format!("Corrupt session {}: {}", id, e))
                })?;
                Ok(Some(session))
            }
            None => Ok(None),
        }
    }

    /// Write the session back and refresh its TTL.
    pub async fn save(&self, session: &SessionData) -> Result<()> {
        let mut session = session.clone();
        session.last_seen_at = Utc::now();
        let json = serde_json::to_string(&session)
            .map_err(|e| AppError::InternalError(format!("Failed to serialize session: {}", e)))?;
        self.redis
            .setex(&Self::session_key(&session.id), &json, self.ttl_secs)
            .await?;
        debug!("💾 Session saved: {}", session.id);
        Ok(())
    }

    /// Bind a session to a user after login or signup.
    pub async fn attach_user(&self, session: &mut SessionData, user_id: &str) -> Result<()> {
        session.user_id = Some(user_id.to_string());
        self.save(session).await
    }

    pub async fn destroy(&self, id: &str) -> Result<()> {
        self.redis.del(&Self::session_key(id)).await?;
        debug!("🗑️ Session destroyed: {}", id);
        Ok(())
    }
}
