use std::sync::Arc;

use tracing::{info, warn};

use crate::services::gemini::{GeminiClient, GeminiPart};
use crate::utils::language::language_name;
use crate::utils::Result;

/// Text translation and language detection on top of Gemini.
pub struct TranslationService {
    gemini: Arc<GeminiClient>,
}

impl TranslationService {
    pub fn new(gemini: Arc<GeminiClient>) -> Self {
        Self { gemini }
    }

    pub async fn translate_text(
        &self,
        text: &str,
        source_language: &str,
        target_language: &str,
    ) -> Result<String> {
        if source_language == target_language {
            return Ok(text.to_string());
        }

        let prompt = format!(
            "Translate the following text from {} to {}. Only provide the translation, no additional text or explanation:\n\n\"{}\"",
            language_name(source_language),
            language_name(target_language),
            text
        );

        let translated = self
            .gemini
            .generate(self.gemini.model(), &[GeminiPart::Text(prompt)])
            .await?;

        info!(
            "🌐 Translated {} chars: {} -> {}",
            text.len(),
            source_language,
            target_language
        );
        Ok(strip_wrapping_quotes(&translated))
    }

    /// Decide which of the two pair languages a transcript is written in.
    /// Returns None when Gemini answers anything but one of the two codes;
    /// detection is advisory, so its failure never fails the request.
    pub async fn detect_language(
        &self,
        text: &str,
        source_code: &str,
        target_code: &str,
    ) -> Option<String> {
        let prompt = format!(
            "Analyze this text and determine if it's written in {lang1} or {lang2}. Respond with only \"{code1}\" for {lang1} or \"{code2}\" for {lang2}. Do not add any other text or markdown.\n\nText: \"{text}\"",
            lang1 = language_name(source_code),
            lang2 = language_name(target_code),
            code1 = source_code,
            code2 = target_code,
            text = text
        );

        match self
            .gemini
            .generate(self.gemini.model(), &[GeminiPart::Text(prompt)])
            .await
        {
            Ok(result) => {
                let code = result.trim().to_lowercase();
                if code == source_code || code == target_code {
                    Some(code)
                } else {
                    warn!(
                        "🔍 Language detection returned unexpected code: {}",
                        code
                    );
                    None
                }
            }
            Err(e) => {
                warn!("🔍 Language detection failed: {}", e);
                None
            }
        }
    }
}

/// Gemini sometimes echoes the quotes from the prompt back.
fn strip_wrapping_quotes(text: &str) -> String {
    text.trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\''])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_wrapping_quotes() {
        assert_eq!(strip_wrapping_quotes("\"muraho\""), "muraho");
        assert_eq!(strip_wrapping_quotes("'bonjour'"), "bonjour");
        assert_eq!(strip_wrapping_quotes("plain text"), "plain text");
    }

    #[test]
    fn test_inner_quotes_survive() {
        assert_eq!(
            strip_wrapping_quotes("he said \"hi\" to me"),
            "he said \"hi\" to me"
        );
    }
}
