use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application error type
#[derive(Debug)]
pub enum AppError {
    // Configuration errors
    ConfigError(String),
    ValidationError(String),

    // Storage errors
    RedisError(String),

    // Authentication errors
    Unauthorized(String),

    // Request errors
    BadRequest(String),
    NotFound(String),
    RateLimitExceeded(String),

    // External service errors
    UpstreamError(String),

    // Internal errors
    InternalError(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::RedisError(msg) => write!(f, "Redis error: {}", msg),
            Self::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            Self::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::RateLimitExceeded(msg) => write!(f, "Rate limit exceeded: {}", msg),
            Self::UpstreamError(msg) => write!(f, "Upstream error: {}", msg),
            Self::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, error_type) = match &self {
            Self::ConfigError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "config_error",
            ),
            Self::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, msg.clone(), "validation_error")
            }
            Self::RedisError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "redis_error",
            ),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone(), "unauthorized"),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), "bad_request"),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), "not_found"),
            Self::RateLimitExceeded(msg) => (
                StatusCode::TOO_MANY_REQUESTS,
                msg.clone(),
                "rate_limit_exceeded",
            ),
            Self::UpstreamError(msg) => (StatusCode::BAD_GATEWAY, msg.clone(), "upstream_error"),
            Self::InternalError(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                msg.clone(),
                "internal_error",
            ),
        };

        let body = Json(json!({
            "message": error_message,
            "type": error_type,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}

// Conversion implementations for common error types
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigError(err.to_string())
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        Self::RedisError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        Self::UpstreamError(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::InternalError(format!("JSON serialization error: {}", err))
    }
}

/// Result type alias for application errors
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = AppError::Unauthorized("Invalid email or password".to_string());
        assert_eq!(error.to_string(), "Unauthorized: Invalid email or password");
    }

    #[test]
    fn test_rate_limit_maps_to_429() {
        let response =
            AppError::RateLimitExceeded("Too many authentication attempts".to_string())
                .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn test_validation_maps_to_400() {
        let response = AppError::ValidationError("First name is required".to_string())
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
