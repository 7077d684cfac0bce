use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: String,
    pub user_id: Option<String>,
    pub star_rating: u8,
    pub feedback_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    pub star_rating: u8,
    pub feedback_message: Option<String>,
}

impl SubmitFeedbackRequest {
    pub fn validate(&self) -> Result<()> {
        if !(1..=5).contains(&self.star_rating) {
            return Err(AppError::ValidationError(
                "Rating must be between 1 and 5 stars".to_string(),
            ));
        }
        if let Some(message) = &self.feedback_message {
            if message.len() > 1000 {
                return Err(AppError::ValidationError(
                    "Feedback message must be less than 1000 characters".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        let mut req = SubmitFeedbackRequest {
            star_rating: 5,
            feedback_message: Some("Great app".to_string()),
        };
        assert!(req.validate().is_ok());

        req.star_rating = 0;
        assert!(req.validate().is_err());
        req.star_rating = 6;
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_message_is_optional() {
        let req = SubmitFeedbackRequest {
            star_rating: 3,
            feedback_message: None,
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_overlong_message_rejected() {
        let req = SubmitFeedbackRequest {
            star_rating: 3,
            feedback_message: Some("x".repeat(1001)),
        };
        assert!(req.validate().is_err());
    }
}
