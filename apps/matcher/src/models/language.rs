//! Language tag normalization shared by the analyzer and the vectorizer.

/// Recognised ISO 639-1 tags, in vector coordinate order.
pub const RECOGNIZED_LANGUAGES: &[&str] = &[
    "ar", "de", "en", "es", "fr", "hi", "it", "ja", "kk", "ko", "nl", "pl", "pt", "ru", "sv",
    "tr", "uk", "uz", "zh",
];

const LANGUAGE_NAMES: &[(&str, &str)] = &[
    ("arabic", "ar"),
    ("german", "de"),
    ("deutsch", "de"),
    ("english", "en"),
    ("английский", "en"),
    ("spanish", "es"),
    ("español", "es"),
    ("french", "fr"),
    ("français", "fr"),
    ("hindi", "hi"),
    ("italian", "it"),
    ("japanese", "ja"),
    ("kazakh", "kk"),
    ("korean", "ko"),
    ("dutch", "nl"),
    ("polish", "pl"),
    ("portuguese", "pt"),
    ("russian", "ru"),
    ("русский", "ru"),
    ("swedish", "sv"),
    ("turkish", "tr"),
    ("ukrainian", "uk"),
    ("українська", "uk"),
    ("uzbek", "uz"),
    ("chinese", "zh"),
    ("mandarin", "zh"),
];

/// Maps a language name or tag ("English", "en-US", "RU") onto a recognised
/// primary tag. Returns `None` for anything outside the recognised set.
pub fn normalize_language_tag(raw: &str) -> Option<&'static str> {
    let folded = raw.trim().to_lowercase();
    if folded.is_empty() {
        return None;
    }

    // Drop proficiency suffixes like "English (C1)" or "German - native".
    let head = folded
        .split(['(', ',', '/', ' '])
        .next()
        .unwrap_or("")
        .trim();

    if let Some((_, tag)) = LANGUAGE_NAMES.iter().find(|(name, _)| *name == head) {
        return Some(tag);
    }

    let primary = head.split(['-', '_']).next().unwrap_or("");
    RECOGNIZED_LANGUAGES
        .iter()
        .copied()
        .find(|tag| *tag == primary)
}

/// Position of a recognised tag in the language block of a feature vector.
pub fn language_index(tag: &str) -> Option<usize> {
    RECOGNIZED_LANGUAGES.iter().position(|t| *t == tag)
}
