use std::path::Path;
use std::time::Instant;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::middleware::{AuthUser, RequestIdentity};
use crate::models::{TranslateRequest, TranslateResponse, UsageLimit};
use crate::routes::ApiState;
use crate::services::{NewTranslation, RateLimitRule};
use crate::utils::audio::decode_base64_audio;
use crate::utils::{AppError, Result};

const SUPER_FAST_PLACEHOLDER: &str = "[Audio processed in super fast mode]";
const TTS_UNAVAILABLE_MESSAGE: &str =
    "Speech synthesis temporarily unavailable. Please try again later.";
const CLONE_LIMIT_MESSAGE: &str = "Too many voice cloning attempts, please try again later.";

pub async fn usage_limit(
    State(state): State<ApiState>,
    identity: RequestIdentity,
) -> Result<Json<UsageLimit>> {
    let limit = state.usage.check_limit(&identity.identity()).await?;
    Ok(Json(limit))
}

pub async fn translate(
    State(state): State<ApiState>,
    identity: RequestIdentity,
    Json(req): Json<TranslateRequest>,
) -> Result<Response> {
    // Persist guest sessions so follow-up requests count per-session
    // instead of per-IP. This request still counts under the identity
    // resolved at arrival.
    if !identity.is_authenticated() {
        state.sessions.save(&identity.session).await?;
    }

    let usage_identity = identity.identity();
    let limit = state.usage.check_limit(&usage_identity).await?;
    if !limit.can_translate {
        return Ok((
            StatusCode::TOO_MANY_REQUESTS,
            Json(json!({
                "message": limit.limit_message,
                "canTranslate": false,
                "remainingTranslations": limit.remaining_translations,
                "isAuthenticated": limit.is_authenticated,
            })),
        )
            .into_response());
    }

    req.validate()?;

    let settings = req.settings.clone().unwrap_or_default();
    let model = settings
        .model
        .clone()
        .unwrap_or_else(|| state.settings.gemini.model.clone());
    let pair = req
        .selected_languages
        .as_ref()
        .map(|langs| (langs.source.as_str(), langs.target.as_str()));

    // Keep the original recording so history can replay it
    let audio_bytes = decode_base64_audio(&req.audio_data)?;
    let original_audio_url = save_audio(&state, &audio_bytes, "wav").await?;

    let original_text: String;
    let translated_text: String;
    let final_source: String;
    let mut final_target = req.target_language.clone();
    let transcription_duration: f64;
    let mut translation_duration = 0.0;

    if settings.super_fast_mode {
        let started = Instant::now();
        translated_text = state
            .speech
            .audio_to_translated_text(
                &req.audio_data,
                &model,
                &req.source_language,
                &req.target_language,
                pair,
            )
            .await?;
        transcription_duration = elapsed_ms(started);
        original_text = SUPER_FAST_PLACEHOLDER.to_string();
        final_source = req.source_language.clone();
    } else {
        let started = Instant::now();
        let transcript = state
            .speech
            .speech_to_text(&req.audio_data, &model, &req.source_language, pair)
            .await?;
        if transcript.trim().is_empty() {
            return Err(AppError::BadRequest(
                "No speech detected in audio. Please try speaking more clearly.".to_string(),
            ));
        }

        let detected = if req.source_language == "auto" {
            match pair {
                Some((source, target)) => {
                    state
                        .translation
                        .detect_language(&transcript, source, target)
                        .await
                }
                None => None,
            }
        } else {
            None
        };
        transcription_duration = elapsed_ms(started);

        final_source = detected
            .clone()
            .unwrap_or_else(|| req.source_language.clone());

        // Detected source equal to the requested target means the speaker
        // used the other language of the pair; flip the target.
        if let Some(detected) = &detected {
            if *detected == req.target_language {
                final_target = match pair {
                    Some((source, target)) => {
                        if detected == source {
                            target.to_string()
                        } else {
                            source.to_string()
                        }
                    }
                    None => "en".to_string(),
                };
                info!(
                    "🔄 Auto-detected {}, flipped target to {}",
                    detected, final_target
                );
            }
        }

        let started = Instant::now();
        original_text = transcript;
        translated_text = state
            .translation
            .translate_text(&original_text, &final_source, &final_target)
            .await?;
        translation_duration = elapsed_ms(started);
    }

    // TTS failure degrades to a text-only response
    let mut translated_audio_url = None;
    let mut tts_available = true;
    let mut tts_error = None;
    let mut tts_duration = 0.0;

    let voice = settings.voice.as_deref().unwrap_or("Rachel");
    let cloned_voice_id = if settings.use_cloned_voice {
        settings.cloned_voice_id.as_deref()
    } else {
        None
    };

    let started = Instant::now();
    match state
        .speech
        .text_to_speech(&translated_text, voice, cloned_voice_id)
        .await
    {
        Ok(audio) => {
            tts_duration = elapsed_ms(started);
            translated_audio_url =
                Some(save_audio(&state, &audio.data, audio.format.extension()).await?);
        }
        Err(e) => {
            warn!("🔇 TTS failed, continuing text-only: {}", e);
            tts_available = false;
            tts_error = Some(TTS_UNAVAILABLE_MESSAGE.to_string());
        }
    }

    // Quota is spent only once the translation has actually succeeded
    state.usage.record_usage(&usage_identity).await?;

    let (user_id, session_id) = if let Some(user_id) = &identity.user_id {
        (Some(user_id.clone()), None)
    } else {
        (None, Some(identity.session.id.clone()))
    };
    let record = state
        .history
        .save(NewTranslation {
            user_id,
            session_id,
            original_text: original_text.clone(),
            translated_text: translated_text.clone(),
            original_language: final_source.clone(),
            target_language: final_target.clone(),
            original_audio_url: Some(original_audio_url.clone()),
            translated_audio_url: translated_audio_url.clone(),
            transcription_duration,
            translation_duration,
            tts_duration,
        })
        .await?;

    Ok(Json(TranslateResponse {
        id: record.id,
        original_text,
        translated_text,
        original_language: final_source,
        target_language: final_target,
        original_audio_url: Some(original_audio_url),
        translated_audio_url,
        tts_available,
        tts_error,
    })
    .into_response())
}

pub async fn clone_voice(
    State(state): State<ApiState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    state
        .rate_limiter
        .check(
            "clone",
            &auth.user_id,
            RateLimitRule {
                window_secs: state.settings.limits.clone_window_secs as u64,
                max_requests: state.settings.limits.clone_max_requests,
            },
            CLONE_LIMIT_MESSAGE,
        )
        .await?;

    let mut audio: Option<Vec<u8>> = None;
    let mut voice_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        match field.name() {
            Some("audio") => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid audio field: {}", e)))?;
                audio = Some(bytes.to_vec());
            }
            Some("voiceName") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid voiceName field: {}", e)))?;
                voice_name = Some(text);
            }
            _ => {}
        }
    }

    let audio = audio.ok_or_else(|| AppError::BadRequest("No audio file provided".to_string()))?;
    let voice_name = voice_name
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("Voice_{}", auth.user_id));

    info!(
        "🎤 Cloning voice for user {}: {} ({} bytes)",
        auth.user_id,
        voice_name,
        audio.len()
    );
    let cloned = state.speech.clone_voice(audio, &voice_name).await?;

    Ok(Json(json!({
        "success": true,
        "voiceId": cloned.voice_id,
        "voiceName": cloned.voice_name,
        "message": format!("Voice \"{}\" cloned successfully!", cloned.voice_name),
    })))
}

async fn save_audio(state: &ApiState, data: &[u8], extension: &str) -> Result<String> {
    let filename = format!("{}.{}", Uuid::new_v4(), extension);
    let dir = Path::new(&state.settings.server.public_dir)
        .join("uploads")
        .join("audio");
    tokio::fs::write(dir.join(&filename), data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to save audio file: {}", e)))?;
    Ok(format!("/uploads/audio/{}", filename))
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
