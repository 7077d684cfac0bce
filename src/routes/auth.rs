use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::info;

use crate::middleware::{clear_session_cookie, AuthUser, RequestIdentity};
use crate::models::{
    ChangePasswordRequest, LoginRequest, SignupRequest, UpdateProfileRequest, UserResponse,
};
use crate::routes::ApiState;
use crate::services::RateLimitRule;
use crate::utils::{AppError, Result};

const AUTH_LIMIT_MESSAGE: &str = "Too many authentication attempts, please try again later.";

fn auth_rate_limit(state: &ApiState) -> RateLimitRule {
    RateLimitRule {
        window_secs: state.settings.limits.auth_window_secs as u64,
        max_requests: state.settings.limits.auth_max_requests,
    }
}

pub async fn signup(
    State(state): State<ApiState>,
    identity: RequestIdentity,
    Json(req): Json<SignupRequest>,
) -> Result<Response> {
    state
        .rate_limiter
        .check(
            "auth",
            identity.client_ip(),
            auth_rate_limit(&state),
            AUTH_LIMIT_MESSAGE,
        )
        .await?;
    req.validate()?;

    let user = state.users.create_user(&req).await?;

    let mut session = identity.session.clone();
    state.sessions.attach_user(&mut session, &user.id).await?;

    info!("✅ Signup complete: {}", user.id);
    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

pub async fn login(
    State(state): State<ApiState>,
    identity: RequestIdentity,
    Json(req): Json<LoginRequest>,
) -> Result<Json<UserResponse>> {
    state
        .rate_limiter
        .check(
            "auth",
            identity.client_ip(),
            auth_rate_limit(&state),
            AUTH_LIMIT_MESSAGE,
        )
        .await?;
    req.validate()?;

    let user = state.users.authenticate(&req.email, &req.password).await?;

    let mut session = identity.session.clone();
    state.sessions.attach_user(&mut session, &user.id).await?;

    info!("🔓 Login: {}", user.id);
    Ok(Json(UserResponse::from(user)))
}

pub async fn logout(
    State(state): State<ApiState>,
    identity: RequestIdentity,
) -> Result<Response> {
    state.sessions.destroy(&identity.session.id).await?;

    let mut response = Json(json!({ "message": "Logged out successfully" })).into_response();
    let cookie = clear_session_cookie()
        .to_string()
        .parse()
        .map_err(|_| AppError::InternalError("Invalid session cookie".to_string()))?;
    response.headers_mut().append(header::SET_COOKIE, cookie);
    Ok(response)
}

pub async fn current_user(
    State(state): State<ApiState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>> {
    let user = state
        .users
        .get_user(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_profile(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>> {
    req.validate()?;
    let user = state.users.update_profile(&auth.user_id, &req).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn change_password(
    State(state): State<ApiState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<serde_json::Value>> {
    req.validate()?;
    state
        .users
        .change_password(&auth.user_id, &req.current_password, &req.new_password)
        .await?;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}
