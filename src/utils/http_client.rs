use reqwest::Client;
use std::time::Duration;

use crate::config::Settings;
use crate::utils::{AppError, Result};

/// Shared HTTP client for outbound provider calls (Gemini, ElevenLabs)
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_millis(settings.server.request_timeout);

        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Get the underlying reqwest client
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_http_client_creation() {
        std::env::set_var(
            "VB_SECURITY__SESSION_SECRET",
            "test_secret_key_minimum_32_chars_long",
        );
        let settings = Settings::new().expect("Failed to load settings");
        let client = HttpClient::new(&settings);
        assert!(client.is_ok());
        std::env::remove_var("VB_SECURITY__SESSION_SECRET");
    }
}
