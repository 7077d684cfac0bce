use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::debug;

use crate::config::GeminiSettings;
use crate::utils::{AppError, HttpClient, Result};

/// Thin client for the Gemini generateContent endpoint.
///
/// Both the transcription and translation paths funnel through
/// [`GeminiClient::generate`], which sends a prompt plus optional inline
/// audio and returns the first candidate's text.
pub struct GeminiClient {
    http: HttpClient,
    settings: GeminiSettings,
}

#[derive(Debug, Clone)]
pub enum GeminiPart {
    Text(String),
    InlineData { mime_type: String, data: String },
}

#[derive(Debug, Serialize)]
struct GeminiContent<'a> {
    role: &'static str,
    parts: &'a [GeminiPartWire<'a>],
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPartWire<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataWire<'a>,
    },
}

#[derive(Debug, Serialize)]
struct InlineDataWire<'a> {
    #[serde(rename = "mimeType")]
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
    #[serde(rename = "inlineData")]
    inline_data: Option<CandidateInlineData>,
}

#[derive(Debug, Deserialize)]
struct CandidateInlineData {
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
    data: String,
}

/// Raw audio candidate from a TTS generation, still base64-encoded.
pub struct GeneratedAudio {
    pub mime_type: String,
    pub base64_data: String,
}

impl GeminiClient {
    pub fn new(http: HttpClient, settings: GeminiSettings) -> Self {
        Self { http, settings }
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub fn tts_model(&self) -> &str {
        &self.settings.tts_model
    }

    /// Send parts to Gemini and return the trimmed text of the first
    /// candidate. Empty candidates are an upstream error.
    pub async fn generate(&self, model: &str, parts: &[GeminiPart]) -> Result<String> {
        let candidate = self.request_candidate(model, parts, None).await?;

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<String>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            let reason = candidate
                .finish_reason
                .unwrap_or_else(|| "unknown".to_string());
            return Err(AppError::UpstreamError(format!(
                "Empty Gemini response (finish reason: {})",
                reason
            )));
        }

        debug!("✨ Gemini returned {} chars from {}", text.len(), model);
        Ok(text)
    }

    /// Request spoken audio for the given text using a prebuilt voice.
    pub async fn generate_speech(
        &self,
        model: &str,
        text: &str,
        voice_name: &str,
    ) -> Result<GeneratedAudio> {
        let config = serde_json::json!({
            "temperature": 1,
            "responseModalities": ["audio"],
            "speechConfig": {
                "voiceConfig": {
                    "prebuiltVoiceConfig": { "voiceName": voice_name }
                }
            }
        });

        let candidate = self
            .request_candidate(model, &[GeminiPart::Text(text.to_string())], Some(config))
            .await?;

        let content = candidate.content.ok_or_else(|| {
            AppError::UpstreamError("No content in Gemini TTS response".to_string())
        })?;
        for part in content.parts {
            if let Some(inline) = part.inline_data {
                return Ok(GeneratedAudio {
                    mime_type: inline
                        .mime_type
                        .unwrap_or_else(|| "audio/L16;rate=24000".to_string()),
                    base64_data: inline.data,
                });
            }
        }

        Err(AppError::UpstreamError(
            "No audio data in Gemini TTS response".to_string(),
        ))
    }

    async fn request_candidate(
        &self,
        model: &str,
        parts: &[GeminiPart],
        generation_config: Option<serde_json::Value>,
    ) -> Result<Candidate> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.settings.api_base_url.trim_end_matches('/'),
            model,
            self.settings.api_key
        );

        let wire_parts: Vec<GeminiPartWire> = parts
            .iter()
            .map(|part| match part {
                GeminiPart::Text(text) => GeminiPartWire::Text { text },
                GeminiPart::InlineData { mime_type, data } => GeminiPartWire::InlineData {
                    inline_data: InlineDataWire { mime_type, data },
                },
            })
            .collect();
        let body = GenerateRequest {
            contents: vec![GeminiContent {
                role: "user",
                parts: &wire_parts,
            }],
            generation_config,
        };

        let response = timeout(
            Duration::from_secs(120),
            self.http
                .client()
                .post(&url)
                .header("Content-Type", "application/json")
                .json(&body)
                .send(),
        )
        .await
        .context("Gemini request timeout")?
        .context("Failed to send Gemini request")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError(format!(
                "Gemini API error ({}): {}",
                status, error_body
            )));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::UpstreamError(format!("Invalid Gemini response: {}", e)))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| AppError::UpstreamError("No candidates in Gemini response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_data_wire_shape() {
        let part = GeminiPartWire::InlineData {
            inline_data: InlineDataWire {
                mime_type: "audio/wav",
                data: "AAAA",
            },
        };
        let json = serde_json::to_string(&part).expect("serialize failed");
        assert_eq!(json, r#"{"inlineData":{"mimeType":"audio/wav","data":"AAAA"}}"#);
    }

    #[test]
    fn test_text_wire_shape() {
        let part = GeminiPartWire::Text { text: "hello" };
        let json = serde_json::to_string(&part).expect("serialize failed");
        assert_eq!(json, r#"{"text":"hello"}"#);
    }
}
