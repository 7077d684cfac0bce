use std::sync::Arc;

use tracing::{info, warn};

use crate::services::elevenlabs::{ClonedVoice, ElevenLabsService};
use crate::services::gemini::{GeminiClient, GeminiPart};
use crate::utils::audio::convert_to_wav;
use crate::utils::language::language_name;
use crate::utils::{AppError, Result};

const GEMINI_FALLBACK_VOICE: &str = "Zephyr";

/// Container format of synthesized audio, used to pick the file extension
/// the saved recording is served under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    Mp3,
    Wav,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Wav => "wav",
        }
    }
}

pub struct SynthesizedAudio {
    pub data: Vec<u8>,
    pub format: AudioFormat,
}

/// Speech understanding and synthesis.
///
/// Transcription and direct audio translation run on Gemini. Synthesis
/// prefers ElevenLabs and falls back to Gemini's TTS models when no
/// ElevenLabs key is configured.
pub struct SpeechService {
    gemini: Arc<GeminiClient>,
    elevenlabs: Arc<ElevenLabsService>,
}

impl SpeechService {
    pub fn new(gemini: Arc<GeminiClient>, elevenlabs: Arc<ElevenLabsService>) -> Self {
        Self { gemini, elevenlabs }
    }

    /// Translate spoken audio straight to target-language text, skipping
    /// the separate transcription step. Used by super fast mode.
    pub async fn audio_to_translated_text(
        &self,
        audio_base64: &str,
        model: &str,
        source_language: &str,
        target_language: &str,
        pair: Option<(&str, &str)>,
    ) -> Result<String> {
        let prompt = if source_language == "auto" {
            match pair {
                Some((lang1, lang2)) => format!(
                    "You are a translator. Listen to this audio. If the speech is {lang1}, output the {lang2} translation. If the speech is {lang2}, output the {lang1} translation. Do not transcribe or output the same language you hear - only translate to the opposite language.",
                    lang1 = language_name(lang1),
                    lang2 = language_name(lang2),
                ),
                None => format!(
                    "Listen to this audio and translate it to {}. Provide only the translation, no other text. Do not transcribe - only translate.",
                    language_name(target_language)
                ),
            }
        } else {
            let target = language_name(target_language);
            format!(
                "Translate this {} audio directly to {target}. Provide only the {target} translation, no other text. Do not transcribe - only translate.",
                language_name(source_language)
            )
        };

        let translated = self
            .gemini
            .generate(
                model,
                &[
                    GeminiPart::Text(prompt),
                    GeminiPart::InlineData {
                        mime_type: "audio/wav".to_string(),
                        data: audio_base64.to_string(),
                    },
                ],
            )
            .await?;

        info!("⚡ Direct audio translation: {} chars", translated.len());
        Ok(translated)
    }

    /// Transcribe audio in its spoken language.
    pub async fn speech_to_text(
        &self,
        audio_base64: &str,
        model: &str,
        language: &str,
        pair: Option<(&str, &str)>,
    ) -> Result<String> {
        let prompt = if language == "auto" {
            match pair {
                Some((lang1, lang2)) => format!(
                    "Generate a transcript of this speech. The audio contains either {} or {}. Please transcribe it accurately in the detected language.",
                    language_name(lang1),
                    language_name(lang2),
                ),
                None => "Generate a transcript of this speech. Please transcribe it accurately in the detected language.".to_string(),
            }
        } else {
            format!(
                "Generate a transcript of this {} speech.",
                language_name(language)
            )
        };

        let transcript = self
            .gemini
            .generate(
                model,
                &[
                    GeminiPart::Text(prompt),
                    GeminiPart::InlineData {
                        mime_type: "audio/wav".to_string(),
                        data: audio_base64.to_string(),
                    },
                ],
            )
            .await?;

        info!("📝 Transcription: {} chars", transcript.len());
        Ok(transcript)
    }

    pub async fn text_to_speech(
        &self,
        text: &str,
        voice_name: &str,
        cloned_voice_id: Option<&str>,
    ) -> Result<SynthesizedAudio> {
        if self.elevenlabs.is_configured() {
            let data = self
                .elevenlabs
                .text_to_speech(text, voice_name, cloned_voice_id)
                .await?;
            return Ok(SynthesizedAudio {
                data,
                format: AudioFormat::Mp3,
            });
        }

        warn!("🔇 ElevenLabs not configured, using Gemini TTS");
        self.text_to_speech_gemini(text).await
    }

    async fn text_to_speech_gemini(&self, text: &str) -> Result<SynthesizedAudio> {
        let audio = self
            .gemini
            .generate_speech(self.gemini.tts_model(), text, GEMINI_FALLBACK_VOICE)
            .await?;

        // Gemini returns raw PCM (audio/L16) that players can't open as-is
        let data = if audio.mime_type.contains("wav") {
            crate::utils::audio::decode_base64_audio(&audio.base64_data)?
        } else {
            convert_to_wav(&audio.base64_data, &audio.mime_type)
                .map_err(|e| AppError::UpstreamError(format!("Invalid TTS audio: {}", e)))?
        };

        Ok(SynthesizedAudio {
            data,
            format: AudioFormat::Wav,
        })
    }

    pub async fn clone_voice(&self, audio: Vec<u8>, voice_name: &str) -> Result<ClonedVoice> {
        self.elevenlabs.clone_voice(audio, voice_name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_format_extensions() {
        assert_eq!(AudioFormat::Mp3.extension(), "mp3");
        assert_eq!(AudioFormat::Wav.extension(), "wav");
    }
}
