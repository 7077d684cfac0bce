use config::{Config, ConfigError, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub redis: RedisSettings,
    pub security: SecuritySettings,
    pub gemini: GeminiSettings,
    pub elevenlabs: ElevenLabsSettings,
    pub limits: LimitSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout: u64, // milliseconds
    pub public_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: u8,
    pub pool_size: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SecuritySettings {
    pub session_secret: String,
    pub session_ttl_days: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub api_base_url: String,
    pub model: String,
    pub tts_model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ElevenLabsSettings {
    pub api_key: String,
    pub api_base_url: String,
    pub model_id: String,
    pub output_format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LimitSettings {
    /// Translations per UTC day for unauthenticated callers
    pub guest_daily_translations: i64,
    pub auth_window_secs: i64,
    pub auth_max_requests: i64,
    pub feedback_window_secs: i64,
    pub feedback_max_requests: i64,
    pub clone_window_secs: i64,
    pub clone_max_requests: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let mut builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("server.request_timeout", 120000)? // 2 minutes
            .set_default("server.public_dir", "public")?
            .set_default("redis.host", "localhost")?
            .set_default("redis.port", 6379)?
            .set_default("redis.db", 0)?
            .set_default("redis.pool_size", 10)?
            .set_default("security.session_secret", "")?
            .set_default("security.session_ttl_days", 7)?
            .set_default("gemini.api_key", "")?
            .set_default(
                "gemini.api_base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("gemini.model", "gemini-2.5-flash")?
            .set_default("gemini.tts_model", "gemini-2.5-flash-preview-tts")?
            .set_default("elevenlabs.api_key", "")?
            .set_default("elevenlabs.api_base_url", "https://api.elevenlabs.io")?
            .set_default("elevenlabs.model_id", "eleven_v3")?
            .set_default("elevenlabs.output_format", "mp3_44100_128")?
            .set_default("limits.guest_daily_translations", 3)?
            .set_default("limits.auth_window_secs", 900)? // 15 minutes
            .set_default("limits.auth_max_requests", 5)?
            .set_default("limits.feedback_window_secs", 60)?
            .set_default("limits.feedback_max_requests", 3)?
            .set_default("limits.clone_window_secs", 3600)?
            .set_default("limits.clone_max_requests", 3)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load config file if exists
            .add_source(File::with_name("config/config").required(false))
            .add_source(File::with_name(&format!("config/config.{}", run_mode)).required(false));

        // Manually override with environment variables (workaround for case sensitivity issues)
        // Security settings
        if let Ok(val) = env::var("VB_SECURITY__SESSION_SECRET") {
            builder = builder.set_override("security.session_secret", val)?;
        }
        if let Ok(val) = env::var("VB_SECURITY__SESSION_TTL_DAYS") {
            builder = builder.set_override("security.session_ttl_days", val)?;
        }

        // Provider credentials (also accept the upstream vendors' conventional names)
        if let Ok(val) = env::var("VB_GEMINI__API_KEY").or_else(|_| env::var("GEMINI_API_KEY")) {
            builder = builder.set_override("gemini.api_key", val)?;
        }
        if let Ok(val) = env::var("VB_GEMINI__MODEL") {
            builder = builder.set_override("gemini.model", val)?;
        }
        if let Ok(val) =
            env::var("VB_ELEVENLABS__API_KEY").or_else(|_| env::var("ELEVENLABS_API_KEY"))
        {
            builder = builder.set_override("elevenlabs.api_key", val)?;
        }

        // Server settings
        if let Ok(val) = env::var("VB_SERVER__HOST") {
            builder = builder.set_override("server.host", val)?;
        }
        if let Ok(val) = env::var("VB_SERVER__PORT") {
            builder = builder.set_override("server.port", val)?;
        }
        if let Ok(val) = env::var("VB_SERVER__REQUEST_TIMEOUT") {
            builder = builder.set_override("server.request_timeout", val)?;
        }
        if let Ok(val) = env::var("VB_SERVER__PUBLIC_DIR") {
            builder = builder.set_override("server.public_dir", val)?;
        }

        // Redis settings
        if let Ok(val) = env::var("VB_REDIS__HOST") {
            builder = builder.set_override("redis.host", val)?;
        }
        if let Ok(val) = env::var("VB_REDIS__PORT") {
            builder = builder.set_override("redis.port", val)?;
        }
        if let Ok(val) = env::var("VB_REDIS__PASSWORD") {
            builder = builder.set_override("redis.password", val)?;
        }
        if let Ok(val) = env::var("VB_REDIS__DB") {
            builder = builder.set_override("redis.db", val)?;
        }
        if let Ok(val) = env::var("VB_REDIS__POOL_SIZE") {
            builder = builder.set_override("redis.pool_size", val)?;
        }

        // Limit settings
        if let Ok(val) = env::var("VB_LIMITS__GUEST_DAILY_TRANSLATIONS") {
            builder = builder.set_override("limits.guest_daily_translations", val)?;
        }

        // Logging settings
        if let Ok(val) = env::var("VB_LOGGING__LEVEL") {
            builder = builder.set_override("logging.level", val)?;
        }
        if let Ok(val) = env::var("VB_LOGGING__FORMAT") {
            builder = builder.set_override("logging.format", val)?;
        }

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        // Validate session secret length
        if self.security.session_secret.len() < 32 {
            return Err("SESSION_SECRET must be at least 32 characters".to_string());
        }

        if self.security.session_ttl_days <= 0 {
            return Err("Session TTL must be at least one day".to_string());
        }

        // Validate Redis pool size
        if self.redis.pool_size == 0 {
            return Err("Redis pool size must be greater than 0".to_string());
        }

        if self.limits.guest_daily_translations < 0 {
            return Err("Guest daily translation limit cannot be negative".to_string());
        }

        // Validate logging level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.as_str()) {
            return Err(format!(
                "Invalid logging level '{}'. Must be one of: {}",
                self.logging.level,
                valid_levels.join(", ")
            ));
        }

        Ok(())
    }

    /// Get Redis connection string
    pub fn redis_url(&self) -> String {
        match &self.redis.password {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                password, self.redis.host, self.redis.port, self.redis.db
            ),
            None => format!(
                "redis://{}:{}/{}",
                self.redis.host, self.redis.port, self.redis.db
            ),
        }
    }

    /// Get server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Session lifetime in seconds
    pub fn session_ttl_secs(&self) -> u64 {
        (self.security.session_ttl_days as u64) * 24 * 60 * 60
    }
}
