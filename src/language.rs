//! Output-language resolution.
//!
//! The service answers in the language the caller asked for, or in the
//! document's own language when no preference was given. Detection is a
//! lightweight local heuristic: script ranges identify non-Latin text
//! outright, and a stopword table scores the Latin-script candidates.

pub const DEFAULT_LANGUAGE: &str = "English";

/// Maps an ISO-style detection code to the display name used in prompts.
pub fn display_name(code: &str) -> Option<&'static str> {
    let name = match code {
        "en" => "English",
        "id" => "Indonesian",
        "es" => "Spanish",
        "fr" => "French",
        "de" => "German",
        "pt" => "Portuguese",
        "it" => "Italian",
        "nl" => "Dutch",
        "ru" => "Russian",
        "ja" => "Japanese",
        "ko" => "Korean",
        "zh-cn" | "zh-tw" => "Chinese",
        "ar" => "Arabic",
        "tr" => "Turkish",
        "vi" => "Vietnamese",
        "th" => "Thai",
        _ => return None,
    };
    Some(name)
}

/// Normalizes an explicitly requested language name: first letter upper,
/// rest lower, so "french" and "FRENCH" both become "French".
pub fn canonical(value: &str) -> String {
    let mut chars = value.trim().chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Detects the language of a text sample, returning a detection code that
/// [`display_name`] understands (or any other code, which callers treat as
/// the default language).
pub trait LanguageDetector: Send + Sync {
    fn detect(&self, sample: &str) -> String;
}

/// Script-range plus stopword-scoring detector.
///
/// Non-Latin scripts are decisive on their own: kana means Japanese (checked
/// before the Han range, which kana-free Chinese then claims), hangul Korean,
/// and so on. Latin-script text is scored against small stopword tables and
/// the best-scoring language wins. Unscoreable input detects as English.
pub struct StopwordDetector;

const STOPWORDS: &[(&str, &[&str])] = &[
    (
        "en",
        &[
            "the", "and", "of", "to", "in", "is", "that", "for", "with", "was", "this", "are",
        ],
    ),
    (
        "id",
        &[
            "yang", "dan", "dari", "untuk", "dengan", "pada", "dalam", "adalah", "ini", "itu",
            "tidak", "akan",
        ],
    ),
    (
        "es",
        &[
            "el", "la", "de", "que", "los", "las", "por", "una", "con", "para", "como", "del",
        ],
    ),
    (
        "fr",
        &[
            "le", "la", "les", "des", "est", "une", "dans", "pour", "que", "qui", "sur", "avec",
        ],
    ),
    (
        "de",
        &[
            "der", "die", "das", "und", "ist", "nicht", "von", "mit", "den", "ein", "eine", "auf",
        ],
    ),
    (
        "pt",
        &[
            "de", "que", "não", "uma", "com", "para", "por", "mais", "dos", "como", "mas", "foi",
        ],
    ),
    (
        "it",
        &[
            "di", "che", "il", "la", "per", "una", "sono", "del", "non", "con", "della", "gli",
        ],
    ),
    (
        "nl",
        &[
            "de", "het", "een", "van", "en", "dat", "niet", "met", "voor", "zijn", "aan", "ook",
        ],
    ),
    (
        "tr",
        &[
            "bir", "ve", "bu", "için", "ile", "olarak", "daha", "gibi", "ancak", "kadar", "olan",
            "çok",
        ],
    ),
    (
        "vi",
        &[
            "của", "và", "các", "có", "được", "trong", "cho", "không", "những", "với", "này",
            "người",
        ],
    ),
];

impl LanguageDetector for StopwordDetector {
    fn detect(&self, sample: &str) -> String {
        if let Some(code) = detect_script(sample) {
            return code.to_string();
        }

        let mut best: Option<(&str, usize)> = None;
        for (code, words) in STOPWORDS {
            let score = sample
                .split(|c: char| !c.is_alphabetic())
                .filter(|token| !token.is_empty())
                .filter(|token| {
                    let token = token.to_lowercase();
                    words.contains(&token.as_str())
                })
                .count();
            if score > 0 && best.is_none_or(|(_, top)| score > top) {
                best = Some((code, score));
            }
        }

        match best {
            Some((code, _)) => code.to_string(),
            None => "en".to_string(),
        }
    }
}

/// Decides by script alone. Kana is checked before Han so Japanese text with
/// kanji does not detect as Chinese.
fn detect_script(sample: &str) -> Option<&'static str> {
    let mut has_han = false;

    for ch in sample.chars() {
        match ch as u32 {
            0x3040..=0x30FF => return Some("ja"),
            0xAC00..=0xD7AF => return Some("ko"),
            0x0600..=0x06FF => return Some("ar"),
            0x0E00..=0x0E7F => return Some("th"),
            0x0400..=0x04FF => return Some("ru"),
            0x4E00..=0x9FFF => has_han = true,
            _ => {}
        }
    }

    if has_han { Some("zh-cn") } else { None }
}
