use anyhow::Result;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};

use voicebridge::routes::{create_api_router, health_check, ping, ApiState};
use voicebridge::services::{
    ElevenLabsService, FeedbackService, GeminiClient, HistoryService, RateLimiter,
    RedisUsageStore, SessionService, SpeechService, TranslationService, UsageService, UserService,
};
use voicebridge::utils::{init_logger, HttpClient};
use voicebridge::{RedisPool, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present, otherwise rely on the environment
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;

    init_logger(&settings)?;

    info!("🚀 VoiceBridge starting...");
    info!("📋 Configuration loaded");

    if let Err(e) = settings.validate() {
        error!("❌ Configuration validation failed: {}", e);
        return Err(anyhow::anyhow!("Invalid configuration: {}", e));
    }
    info!("✅ Configuration validated");

    let redis = RedisPool::new(&settings)?;
    info!("🔌 Redis connection pool created");

    match redis.ping().await {
        Ok(_) => info!("✅ Redis connection established"),
        Err(e) => {
            error!("❌ Redis connection failed: {}", e);
            return Err(anyhow::anyhow!("Failed to connect to Redis: {}", e));
        }
    }

    let http_client = HttpClient::new(&settings)?;
    info!("🌐 HTTP client initialized");

    let settings_arc = Arc::new(settings.clone());
    let redis_arc = Arc::new(redis.clone());

    let sessions = Arc::new(SessionService::new(
        redis_arc.clone(),
        settings.session_ttl_secs(),
    ));
    info!("🍪 Session service initialized");

    let users = Arc::new(UserService::new(redis_arc.clone()));
    info!("👤 User service initialized");

    let usage_store = Arc::new(RedisUsageStore::new(redis_arc.clone()));
    let usage = Arc::new(UsageService::new(
        usage_store,
        settings.limits.guest_daily_translations,
    ));
    info!(
        "📊 Usage service initialized ({} guest translations/day)",
        settings.limits.guest_daily_translations
    );

    let gemini = Arc::new(GeminiClient::new(
        http_client.clone(),
        settings.gemini.clone(),
    ));
    if settings.gemini.api_key.is_empty() {
        warn!("⚠️  GEMINI_API_KEY not set, translation requests will fail");
    }
    info!("🧠 Gemini client initialized ({})", settings.gemini.model);

    let elevenlabs = Arc::new(ElevenLabsService::new(
        http_client.clone(),
        settings.elevenlabs.clone(),
    ));
    if elevenlabs.is_configured() {
        info!("🔊 ElevenLabs TTS initialized");
    } else {
        warn!("⚠️  ELEVENLABS_API_KEY not set, falling back to Gemini TTS");
    }

    let translation = Arc::new(TranslationService::new(gemini.clone()));
    let speech = Arc::new(SpeechService::new(gemini, elevenlabs));
    info!("🎙️ Speech pipeline initialized");

    let history = Arc::new(HistoryService::new(redis_arc.clone()));
    let feedback = Arc::new(FeedbackService::new(redis_arc.clone()));
    let rate_limiter = Arc::new(RateLimiter::new(redis_arc.clone()));

    // Saved recordings are served back from the public dir
    let uploads_dir = PathBuf::from(&settings.server.public_dir)
        .join("uploads")
        .join("audio");
    tokio::fs::create_dir_all(&uploads_dir)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", uploads_dir.display(), e))?;
    info!("📁 Audio uploads dir: {}", uploads_dir.display());

    let api_state = ApiState {
        settings: settings_arc,
        redis: redis_arc,
        sessions,
        users,
        usage,
        translation,
        speech,
        history,
        feedback,
        rate_limiter,
    };

    let static_dir = PathBuf::from(&settings.server.public_dir);
    let serve_dir = ServeDir::new(&static_dir).append_index_html_on_directories(true);
    info!("📁 Static files serving from: {}", static_dir.display());

    let app = Router::new()
        .route("/health", get(health_check))
        .route("/ping", get(ping))
        .with_state(api_state.clone())
        .nest("/api", create_api_router(api_state))
        .fallback_service(serve_dir);

    let bind_addr = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", bind_addr, e))?;

    info!("🚀 Server ready on http://{}", bind_addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    info!("👋 Shutting down...");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Signal received, starting graceful shutdown");
}
