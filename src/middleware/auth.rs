use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::middleware::session::RequestIdentity;
use crate::utils::AppError;

#[async_trait]
impl<S> FromRequestParts<S> for RequestIdentity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestIdentity>()
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError("Session middleware not installed".to_string())
            })
    }
}

/// Extractor for handlers that require a logged-in user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub identity: RequestIdentity,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let identity = RequestIdentity::from_request_parts(parts, state).await?;
        let user_id = identity
            .user_id
            .clone()
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;
        Ok(AuthUser { user_id, identity })
    }
}
