/// Language codes accepted by the translate API (`auto` means detect)
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "en", "es", "fr", "de", "zh", "ja", "ko", "ar", "hi", "pt", "ru", "it", "rw", "sw", "am",
    "yo", "ha", "ig", "auto",
];

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("en", "English"),
    ("es", "Spanish"),
    ("fr", "French"),
    ("de", "German"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("pt", "Portuguese"),
    ("ru", "Russian"),
    ("it", "Italian"),
    ("rw", "Kinyarwanda"),
    ("sw", "Swahili"),
    ("am", "Amharic"),
    ("yo", "Yoruba"),
    ("ha", "Hausa"),
    ("ig", "Igbo"),
];

/// Human-readable name for a language code; unknown codes pass through
pub fn language_name(code: &str) -> &str {
    LANGUAGE_NAMES
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or(code)
}

pub fn is_supported(code: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&code)
}
