use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::{TranslationRecord, TranslationStats};
use crate::redis::RedisPool;
use crate::utils::{AppError, Result};

const GLOBAL_INDEX: &str = "translations:all";
const HISTORY_PAGE_SIZE: isize = 50;
const STATS_PAGE_SIZE: isize = 500;

/// Fields of a translation record the pipeline produces; ids and
/// timestamps are filled in on save.
pub struct NewTranslation {
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub original_text: String,
    pub translated_text: String,
    pub original_language: String,
    pub target_language: String,
    pub original_audio_url: Option<String>,
    pub translated_audio_url: Option<String>,
    pub transcription_duration: f64,
    pub translation_duration: f64,
    pub tts_duration: f64,
}

/// Translation history.
///
/// Records live at `translation:{id}`. Each owner (a user or a session) has
/// a sorted set `translations:{owner}` scored by creation time, and a
/// global set backs the stats endpoint.
pub struct HistoryService {
    redis: Arc<RedisPool>,
}

impl HistoryService {
    pub fn new(redis: Arc<RedisPool>) -> Self {
        Self { redis }
    }

    fn record_key(id: &str) -> String {
        format!("translation:{}", id)
    }

    fn owner_index_key(owner: &str) -> String {
        format!("translations:{}", owner)
    }

    /// History owner key: the user when logged in, the session otherwise.
    fn owner_of(user_id: Option<&str>, session_id: Option<&str>) -> Option<String> {
        match (user_id, session_id) {
            (Some(user_id), _) => Some(format!("user:{}", user_id)),
            (None, Some(session_id)) => Some(format!("session:{}", session_id)),
            (None, None) => None,
        }
    }

    pub async fn save(&self, new: NewTranslation) -> Result<TranslationRecord> {
        let record = TranslationRecord {
            id: Uuid::new_v4().to_string(),
            user_id: new.user_id,
            session_id: new.session_id,
            original_text: new.original_text,
            translated_text: new.translated_text,
            original_language: new.original_language,
            target_language: new.target_language,
            original_audio_url: new.original_audio_url,
            translated_audio_url: new.translated_audio_url,
            transcription_duration: new.transcription_duration,
            translation_duration: new.translation_duration,
            tts_duration: new.tts_duration,
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&record).map_err(|e| {
            AppError::InternalError(format!("Failed to serialize translation: {}", e))
        })?;
        self.redis.set(&Self::record_key(&record.id), &json).await?;

        let score = record.created_at.timestamp_millis() as f64;
        if let Some(owner) = Self::owner_of(record.user_id.as_deref(), record.session_id.as_deref())
        {
            self.redis
                .zadd(&Self::owner_index_key(&owner), score, &record.id)
                .await?;
        }
        self.redis.zadd(GLOBAL_INDEX, score, &record.id).await?;

        debug!("📜 Translation saved: {}", record.id);
        Ok(record)
    }

    /// Most recent translations for the current owner, newest first.
    /// Callers with neither a user nor a session get an empty history.
    pub async fn list(
        &self,
        user_id: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Vec<TranslationRecord>> {
        let owner = match Self::owner_of(user_id, session_id) {
            Some(owner) => owner,
            None => return Ok(Vec::new()),
        };
        let index_key = Self::owner_index_key(&owner);
        let ids = self
            .redis
            .zrevrange(&index_key, 0, HISTORY_PAGE_SIZE - 1)
            .await?;
        self.load_records(&ids, Some(&index_key)).await
    }

    pub async fn clear(&self, user_id: Option<&str>, session_id: Option<&str>) -> Result<u64> {
        let owner = match Self::owner_of(user_id, session_id) {
            Some(owner) => owner,
            None => return Ok(0),
        };
        let index_key = Self::owner_index_key(&owner);
        let ids = self.redis.zrevrange(&index_key, 0, -1).await?;
        for id in &ids {
            self.redis.del(&Self::record_key(id)).await?;
            self.redis.zrem(GLOBAL_INDEX, id).await?;
        }
        self.redis.del(&index_key).await?;
        debug!("🧹 Cleared {} translations for {}", ids.len(), owner);
        Ok(ids.len() as u64)
    }

    /// Global translation stats with the most recent records.
    pub async fn stats(&self) -> Result<TranslationStats> {
        let ids = self
            .redis
            .zrevrange(GLOBAL_INDEX, 0, STATS_PAGE_SIZE - 1)
            .await?;
        let records = self.load_records(&ids, Some(GLOBAL_INDEX)).await?;

        let total = records.len() as u64;
        let avg = |f: fn(&TranslationRecord) -> f64| {
            if records.is_empty() {
                0.0
            } else {
                records.iter().map(f).sum::<f64>() / records.len() as f64
            }
        };

        Ok(TranslationStats {
            total_translations: total,
            average_transcription_duration: avg(|r| r.transcription_duration),
            average_translation_duration: avg(|r| r.translation_duration),
            average_tts_duration: avg(|r| r.tts_duration),
            translations: records,
        })
    }

    async fn load_records(
        &self,
        ids: &[String],
        prune_index: Option<&str>,
    ) -> Result<Vec<TranslationRecord>> {
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            match self.redis.get::<String>(&Self::record_key(id)).await? {
                Some(json) => match serde_json::from_str::<TranslationRecord>(&json) {
                    Ok(record) => records.push(record),
                    Err(e) => warn!("📜 Skipping corrupt translation {}: {}", id, e),
                },
                // Record deleted out from under its index, drop the entry
                None => {
                    if let Some(index) = prune_index {
                        self.redis.zrem(index, id).await?;
                    }
                }
            }
        }
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owner_prefers_user() {
        assert_eq!(
            HistoryService::owner_of(Some("u1"), Some("s1")).as_deref(),
            Some("user:u1")
        );
        assert_eq!(
            HistoryService::owner_of(None, Some("s1")).as_deref(),
            Some("session:s1")
        );
        assert_eq!(HistoryService::owner_of(None, None), None);
    }
}
