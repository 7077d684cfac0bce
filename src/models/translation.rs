use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::language::is_supported;
use crate::utils::{AppError, Result};

/// Persisted record of one completed translation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRecord {
    pub id: String,
    pub user_id: Option<String>,
    pub session_id: Option<String>,
    pub original_text: String,
    pub translated_text: String,
    pub original_language: String,
    pub target_language: String,
    pub original_audio_url: Option<String>,
    pub translated_audio_url: Option<String>,
    /// Upstream call durations in milliseconds
    pub transcription_duration: f64,
    pub translation_duration: f64,
    pub tts_duration: f64,
    pub created_at: DateTime<Utc>,
}

/// Per-request playback settings sent alongside the audio
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationSettings {
    pub model: Option<String>,
    pub voice: Option<String>,
    #[serde(default)]
    pub super_fast_mode: bool,
    pub cloned_voice_id: Option<String>,
    #[serde(default)]
    pub use_cloned_voice: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedLanguages {
    pub source: String,
    pub target: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub audio_data: String,
    pub source_language: String,
    pub target_language: String,
    #[serde(default)]
    pub settings: Option<TranslationSettings>,
    #[serde(default)]
    pub selected_languages: Option<SelectedLanguages>,
}

impl TranslateRequest {
    pub fn validate(&self) -> Result<()> {
        if self.audio_data.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Audio data is required".to_string(),
            ));
        }
        if !is_supported(&self.source_language) {
            return Err(AppError::ValidationError(format!(
                "Unsupported source language: {}",
                self.source_language
            )));
        }
        if self.target_language == "auto" || !is_supported(&self.target_language) {
            return Err(AppError::ValidationError(format!(
                "Unsupported target language: {}",
                self.target_language
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub id: String,
    pub original_text: String,
    pub translated_text: String,
    pub original_language: String,
    pub target_language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated_audio_url: Option<String>,
    pub tts_available: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tts_error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationStats {
    pub total_translations: u64,
    pub average_transcription_duration: f64,
    pub average_translation_duration: f64,
    pub average_tts_duration: f64,
    pub translations: Vec<TranslationRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(json: &str) -> TranslateRequest {
        serde_json::from_str(json).expect("deserialize failed")
    }

    #[test]
    fn test_request_defaults() {
        let req = request(r#"{"audioData":"AAAA","sourceLanguage":"en","targetLanguage":"rw"}"#);
        assert!(req.settings.is_none());
        assert!(req.selected_languages.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_settings_defaults() {
        let req = request(
            r#"{"audioData":"AAAA","sourceLanguage":"auto","targetLanguage":"rw","settings":{"voice":"Adam"},"selectedLanguages":{"source":"en","target":"rw"}}"#,
        );
        assert!(req.validate().is_ok());
        let settings = req.settings.expect("missing settings");
        assert!(!settings.super_fast_mode);
        assert!(!settings.use_cloned_voice);
        assert_eq!(settings.voice.as_deref(), Some("Adam"));
    }

    #[test]
    fn test_rejects_empty_audio() {
        let req = request(r#"{"audioData":"  ","sourceLanguage":"en","targetLanguage":"rw"}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_rejects_auto_target() {
        let req = request(r#"{"audioData":"AAAA","sourceLanguage":"en","targetLanguage":"auto"}"#);
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_response_omits_absent_audio() {
        let resp = TranslateResponse {
            id: "t1".to_string(),
            original_text: "hello".to_string(),
            translated_text: "muraho".to_string(),
            original_language: "en".to_string(),
            target_language: "rw".to_string(),
            original_audio_url: Some("/uploads/audio/a.wav".to_string()),
            translated_audio_url: None,
            tts_available: false,
            tts_error: Some("Speech synthesis temporarily unavailable. Please try again later.".to_string()),
        };
        let json = serde_json::to_string(&resp).expect("serialize failed");
        assert!(json.contains("\"originalAudioUrl\""));
        assert!(!json.contains("translatedAudioUrl"));
        assert!(json.contains("\"ttsAvailable\":false"));
    }
}
