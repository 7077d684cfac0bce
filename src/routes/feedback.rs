use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::middleware::{AuthUser, RequestIdentity};
use crate::models::{Feedback, SubmitFeedbackRequest};
use crate::routes::ApiState;
use crate::services::RateLimitRule;
use crate::utils::Result;

const FEEDBACK_LIMIT_MESSAGE: &str = "Too many feedback submissions, please try again later.";

pub async fn submit_feedback(
    State(state): State<ApiState>,
    identity: RequestIdentity,
    Json(req): Json<SubmitFeedbackRequest>,
) -> Result<Response> {
    state
        .rate_limiter
        .check(
            "feedback",
            identity.client_ip(),
            RateLimitRule {
                window_secs: state.settings.limits.feedback_window_secs as u64,
                max_requests: state.settings.limits.feedback_max_requests,
            },
            FEEDBACK_LIMIT_MESSAGE,
        )
        .await?;

    req.validate()?;

    let feedback = state
        .feedback
        .submit(&req, identity.user_id.as_deref())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Thank you for your feedback!",
            "feedback": feedback,
        })),
    )
        .into_response())
}

pub async fn list_feedback(
    State(state): State<ApiState>,
    _auth: AuthUser,
) -> Result<Json<Vec<Feedback>>> {
    let entries = state.feedback.list().await?;
    Ok(Json(entries))
}
