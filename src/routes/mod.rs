pub mod auth;
pub mod feedback;
pub mod health;
pub mod history;
pub mod translate;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::config::Settings;
use crate::redis::RedisPool;
use crate::services::{
    FeedbackService, HistoryService, RateLimiter, SessionService, SpeechService,
    TranslationService, UsageService, UserService,
};

pub use health::{health_check, ping};

/// State shared by all API handlers
#[derive(Clone)]
pub struct ApiState {
    pub settings: Arc<Settings>,
    pub redis: Arc<RedisPool>,
    pub sessions: Arc<SessionService>,
    pub users: Arc<UserService>,
    pub usage: Arc<UsageService>,
    pub translation: Arc<TranslationService>,
    pub speech: Arc<SpeechService>,
    pub history: Arc<HistoryService>,
    pub feedback: Arc<FeedbackService>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// All /api routes, with the session middleware applied.
pub fn create_api_router(state: ApiState) -> Router {
    Router::new()
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/user", get(auth::current_user))
        .route("/auth/profile", put(auth::update_profile))
        .route("/auth/change-password", put(auth::change_password))
        .route("/translate", post(translate::translate))
        .route("/usage-limit", get(translate::usage_limit))
        .route("/clone-voice", post(translate::clone_voice))
        .route(
            "/translations",
            get(history::list_translations).delete(history::clear_translations),
        )
        .route("/stats", get(history::translation_stats))
        .route(
            "/feedback",
            post(feedback::submit_feedback).get(feedback::list_feedback),
        )
        .layer(middleware::from_fn_with_state(
            state.sessions.clone(),
            crate::middleware::resolve_session,
        ))
        .with_state(state)
}
