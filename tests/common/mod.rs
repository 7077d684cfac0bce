use voicebridge::{RedisPool, Settings};

/// Test context pointing at a disposable Redis instance.
///
/// Reads `REDIS_URL` (redis://host:port) or falls back to localhost:6379.
/// Tests using this are `#[ignore]`d so the default suite stays
/// self-contained; run them with `cargo test -- --ignored` against a
/// throwaway Redis.
pub struct TestContext {
    pub settings: Settings,
    pub redis: RedisPool,
}

impl TestContext {
    pub async fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let (host, port) = match std::env::var("REDIS_URL") {
            Ok(url) => {
                let parts: Vec<&str> = url
                    .strip_prefix("redis://")
                    .unwrap_or(&url)
                    .split(':')
                    .collect();
                let host = parts.first().unwrap_or(&"127.0.0.1").to_string();
                let port = parts.get(1).and_then(|p| p.parse().ok()).unwrap_or(6379);
                (host, port)
            }
            Err(_) => ("127.0.0.1".to_string(), 6379),
        };

        let mut settings = Settings::new()?;
        settings.redis.host = host;
        settings.redis.port = port;
        settings.redis.password = None;
        settings.security.session_secret = "test_secret_key_minimum_32_chars_long".to_string();

        let redis = RedisPool::new(&settings)?;
        redis.ping().await?;

        Ok(Self { settings, redis })
    }
}
