/// Target languages offered to the agent, as (display name, code) pairs.
pub const SUPPORTED_LANGUAGES: &[(&str, &str)] = &[
    ("English", "en"),
    ("Hindi", "hi"),
    ("Gujarati", "gu"),
    ("Punjabi", "pa"),
    ("Tamil", "ta"),
    ("Telugu", "te"),
    ("Kannada", "kn"),
    ("Malayalam", "ml"),
    ("Bengali", "bn"),
    ("Marathi", "mr"),
    ("Urdu", "ur"),
    ("Odia", "or"),
    ("Assamese", "as"),
    ("Maithili", "mai"),
    ("Santali", "sat"),
    ("French", "fr"),
    ("Spanish", "es"),
    ("Portuguese", "pt"),
    ("Italian", "it"),
    ("Russian", "ru"),
    ("Swedish", "sv"),
    ("Dutch", "nl"),
    ("Arabic", "ar"),
    ("Turkish", "tr"),
    ("German", "de"),
    ("Danish", "da"),
    ("Greek", "el"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    pub name: &'static str,
    pub code: &'static str,
}

/// Look up a supported language by display name or code, case-insensitively
pub fn lookup(query: &str) -> Option<Language> {
    let query = query.trim();
    SUPPORTED_LANGUAGES
        .iter()
        .find(|(name, code)| name.eq_ignore_ascii_case(query) || code.eq_ignore_ascii_case(query))
        .map(|&(name, code)| Language { name, code })
}

pub fn all() -> impl Iterator<Item = Language> {
    SUPPORTED_LANGUAGES.iter().map(|&(name, code)| Language { name, code })
}

/// Convert language code to full language name for display and prompts
pub fn code_to_name(code: &str) -> String {
    if let Some(language) = lookup(code) {
        return language.name.to_string();
    }

    // Codes a detector may report that are not offered as targets
    match code.to_lowercase().as_str() {
        "ja" => "Japanese".to_string(),
        "ko" => "Korean".to_string(),
        "zh" | "zh-cn" | "zh-tw" => "Chinese".to_string(),
        "pl" => "Polish".to_string(),
        "th" => "Thai".to_string(),
        "vi" => "Vietnamese".to_string(),
        "no" => "Norwegian".to_string(),
        "fi" => "Finnish".to_string(),
        "he" | "iw" => "Hebrew".to_string(),
        "uk" => "Ukrainian".to_string(),
        "ne" => "Nepali".to_string(),
        "si" => "Sinhala".to_string(),
        "fa" => "Persian".to_string(),
        _ => code.to_string(),
    }
}

/// Map a classifier label (a name such as "French" or a code such as "fr")
/// to a language code usable as a translation source hint.
pub fn resolve_hint(label: &str) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }
    if let Some(language) = lookup(label) {
        return Some(language.code.to_string());
    }
    let lower = label.to_lowercase();
    if lower.len() <= 3 && lower.chars().all(|c| c.is_ascii_lowercase()) {
        return Some(lower);
    }
    None
}
