use std::time::Duration;

use anyhow::Context;
use reqwest::multipart;
use serde::Deserialize;
use tokio::time::timeout;
use tracing::info;

use crate::config::ElevenLabsSettings;
use crate::utils::{AppError, HttpClient, Result};

/// Preset ElevenLabs voices by display name.
const VOICES: &[(&str, &str)] = &[
    ("Rachel", "21m00Tcm4TlvDq8ikWAM"),
    ("Drew", "29vD33N1CtxCmqQRPOHJ"),
    ("Clyde", "2EiwWnXFnvU5JabPnv8n"),
    ("Paul", "5Q0t7uMcjvnagumLfvZi"),
    ("Domi", "AZnzlk1XvdvUeBnXmlld"),
    ("Dave", "CYw3kZ02Hs0563khs1Fj"),
    ("Fin", "D38z5RcWu1voky8WS1ja"),
    ("Sarah", "EXAVITQu4vr4xnSDxMaL"),
    ("Antoni", "ErXwobaYiN019PkySvjV"),
    ("Thomas", "GBv7mTt0atIp3Br8iCZE"),
    ("Charlie", "IKne3meq5aSn9XLyUdCD"),
    ("George", "JBFqnCBsd6RMkjVDRZzb"),
    ("Emily", "LcfcDJNUP1GQjkzn1xUU"),
    ("Elli", "MF3mGyEYCl7XYWbV9V6O"),
    ("Callum", "N2lVS1w4EtoT3dr4eOWO"),
    ("Patrick", "ODq5zmih8GrVes37Dizd"),
    ("Harry", "SOYHLrjzK2X1ezoPC6cr"),
    ("Liam", "TX3LPaxmHKxFdv7VOQHJ"),
    ("Dorothy", "ThT5KcBeYPX3keUQqHPh"),
    ("Josh", "TxGEqnHWrfWFTfGW9XjX"),
    ("Arnold", "VR6AewLTigWG4xSOukaG"),
    ("Charlotte", "XB0fDUnXU5powFXDhCwa"),
    ("Alice", "Xb7hH8MSUJpSbSDYk0k2"),
    ("Matilda", "XrExE9yKIg1WjnnlVkGX"),
    ("James", "ZQe5CZNOzWyzPSCn5a3c"),
    ("Joseph", "Zlb1dXrM653N07WRdFW3"),
    ("Jeremy", "bVMeCyTHy58xNoL34h3p"),
    ("Michael", "flq6f7yk4E4fJM5XTYuZ"),
    ("Ethan", "g5CIjZEefAph4nQFvHAz"),
    ("Chris", "iP95p4xoKVk53GoZ742B"),
    ("Gigi", "jBpfuIE2acCO8z3wKNLl"),
    ("Freya", "jsCqWAovK2LkecY7zXl4"),
    ("Brian", "nPczCjzI2devNBz1zQrb"),
    ("Grace", "oWAxZDx7w5VEj9dCyTzz"),
    ("Daniel", "onwK4e9ZLuTAKqWW03F9"),
    ("Lily", "pFZP5JQG7iQjIQuC4Bku"),
    ("Serena", "pMsXgVXv3BLzUgSXRplE"),
    ("Adam", "pNInz6obpgDQGcFmaJgB"),
    ("Nicole", "piTKgcLEGmPE4e6mEKli"),
    ("Bill", "pqHfZKP75CvOlQylNhV4"),
    ("Jessie", "t0jbNlBVZ17f02VDIeMI"),
    ("Sam", "yoZ06aMxZJJ28mfd3POQ"),
];

const DEFAULT_VOICE: &str = "Rachel";

/// Unknown names fall back to the default voice rather than erroring.
pub fn voice_id(voice_name: &str) -> &'static str {
    VOICES
        .iter()
        .find(|(name, _)| *name == voice_name)
        .or_else(|| VOICES.iter().find(|(name, _)| *name == DEFAULT_VOICE))
        .map(|(_, id)| *id)
        .unwrap_or("21m00Tcm4TlvDq8ikWAM")
}

#[derive(Debug, Deserialize)]
struct CloneVoiceResponse {
    voice_id: String,
}

pub struct ClonedVoice {
    pub voice_id: String,
    pub voice_name: String,
}

/// ElevenLabs speech synthesis and voice cloning.
pub struct ElevenLabsService {
    http: HttpClient,
    settings: ElevenLabsSettings,
}

impl ElevenLabsService {
    pub fn new(http: HttpClient, settings: ElevenLabsSettings) -> Self {
        Self { http, settings }
    }

    pub fn is_configured(&self) -> bool {
        !self.settings.api_key.trim().is_empty()
    }

    fn require_api_key(&self) -> Result<&str> {
        let key = self.settings.api_key.trim();
        if key.is_empty() {
            return Err(AppError::UpstreamError(
                "ELEVENLABS_API_KEY is not configured".to_string(),
            ));
        }
        Ok(key)
    }

    /// Synthesize text into MP3 audio. A cloned voice id, when given,
    /// overrides the preset voice name.
    pub async fn text_to_speech(
        &self,
        text: &str,
        voice_name: &str,
        cloned_voice_id: Option<&str>,
    ) -> Result<Vec<u8>> {
        let api_key = self.require_api_key()?;
        let voice = cloned_voice_id.unwrap_or_else(|| voice_id(voice_name));
        let url = format!(
            "{}/v1/text-to-speech/{}?output_format={}",
            self.settings.api_base_url.trim_end_matches('/'),
            voice,
            self.settings.output_format
        );

        let response = timeout(
            Duration::from_secs(60),
            self.http
                .client()
                .post(&url)
                .header("xi-api-key", api_key)
                .json(&serde_json::json!({
                    "text": text,
                    "model_id": self.settings.model_id,
                }))
                .send(),
        )
        .await
        .context("ElevenLabs request timeout")?
        .context("Failed to send ElevenLabs request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "ElevenLabs API error ({}): {}",
                status, error_body
            )));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Failed to read audio stream: {}", e)))?;
        info!("🔊 TTS generated: {} bytes with voice {}", audio.len(), voice);
        Ok(audio.to_vec())
    }

    /// Create an instant voice clone from a recorded sample.
    pub async fn clone_voice(&self, audio: Vec<u8>, voice_name: &str) -> Result<ClonedVoice> {
        let api_key = self.require_api_key()?;
        let url = format!(
            "{}/v1/voices/add",
            self.settings.api_base_url.trim_end_matches('/')
        );

        let sample = multipart::Part::bytes(audio)
            .file_name("voice_sample.wav")
            .mime_str("audio/wav")
            .map_err(|e| AppError::InternalError(format!("Invalid sample mime type: {}", e)))?;
        let form = multipart::Form::new()
            .text("name", voice_name.to_string())
            .text("description", "Cloned voice from user recording")
            .part("files", sample);

        let response = timeout(
            Duration::from_secs(120),
            self.http
                .client()
                .post(&url)
                .header("xi-api-key", api_key)
                .multipart(form)
                .send(),
        )
        .await
        .context("ElevenLabs request timeout")?
        .context("Failed to send voice clone request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "Voice cloning failed ({}): {}",
                status, error_body
            )));
        }

        let parsed: CloneVoiceResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Invalid clone response: {}", e)))?;
        info!("🎙️ Voice cloned: {} -> {}", voice_name, parsed.voice_id);

        Ok(ClonedVoice {
            voice_id: parsed.voice_id,
            voice_name: voice_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_voice_resolves() {
        assert_eq!(voice_id("Adam"), "pNInz6obpgDQGcFmaJgB");
    }

    #[test]
    fn test_unknown_voice_falls_back_to_rachel() {
        assert_eq!(voice_id("Nobody"), "21m00Tcm4TlvDq8ikWAM");
    }

}
