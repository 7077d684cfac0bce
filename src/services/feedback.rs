use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{Feedback, SubmitFeedbackRequest};
use crate::redis::RedisPool;
use crate::utils::{AppError, Result};

const FEEDBACK_INDEX: &str = "feedbacks";
const FEEDBACK_PAGE_SIZE: isize = 100;

pub struct FeedbackService {
    redis: Arc<RedisPool>,
}

impl FeedbackService {
    pub fn new(redis: Arc<RedisPool>) -> Self {
        Self { redis }
    }

    fn feedback_key(id: &str) -> String {
        format!("feedback:{}", id)
    }

    pub async fn submit(
        &self,
        req: &SubmitFeedbackRequest,
        user_id: Option<&str>,
    ) -> Result<Feedback> {
        let feedback = Feedback {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.map(|id| id.to_string()),
            star_rating: req.star_rating,
            feedback_message: req
                .feedback_message
                .as_ref()
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty()),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&feedback)
            .map_err(|e| AppError::InternalError(format!("Failed to serialize feedback: {}", e)))?;
        self.redis
            .set(&Self::feedback_key(&feedback.id), &json)
            .await?;
        self.redis
            .zadd(
                FEEDBACK_INDEX,
                feedback.created_at.timestamp_millis() as f64,
                &feedback.id,
            )
            .await?;

        info!("💬 Feedback received: {} stars", feedback.star_rating);
        Ok(feedback)
    }

    pub async fn list(&self) -> Result<Vec<Feedback>> {
        let ids = self
            .redis
            .zrevrange(FEEDBACK_INDEX, 0, FEEDBACK_PAGE_SIZE - 1)
            .await?;

        let mut entries = Vec::with_capacity(ids.len());
        for id in ids {
            match self.redis.get::<String>(&Self::feedback_key(&id)).await? {
                Some(json) => match serde_json::from_str::<Feedback>(&json) {
                    Ok(feedback) => entries.push(feedback),
                    Err(e) => warn!("💬 Skipping corrupt feedback {}: {}", id, e),
                },
                None => {
                    self.redis.zrem(FEEDBACK_INDEX, &id).await?;
                }
            }
        }
        Ok(entries)
    }
}
