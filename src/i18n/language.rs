//! Language code handling.
//!
//! Codes are short ISO 639 tags (`en`, `ka`, `he`), optionally with a
//! region/script subtag (`pt-br`). They are stored lowercase.

use regex::Regex;
use std::sync::OnceLock;

static CODE_REGEX: OnceLock<Regex> = OnceLock::new();

fn code_regex() -> &'static Regex {
    CODE_REGEX.get_or_init(|| {
        Regex::new(r"^[a-z]{2,3}(-[a-z0-9]{2,8})?$").expect("language code regex is valid")
    })
}

/// Normalize a caller-supplied language code (trim, lowercase, `_` → `-`).
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_ascii_lowercase().replace('_', "-")
}

/// Check whether an already-normalized code has a plausible shape.
pub fn is_well_formed(code: &str) -> bool {
    code_regex().is_match(code)
}

/// Static metadata for a language the platform knows how to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownLanguage {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
    pub rtl: bool,
}

const KNOWN_LANGUAGES: &[KnownLanguage] = &[
    KnownLanguage {
        code: "en",
        name: "English",
        native_name: "English",
        rtl: false,
    },
    KnownLanguage {
        code: "ka",
        name: "Georgian",
        native_name: "ქართული",
        rtl: false,
    },
    KnownLanguage {
        code: "ru",
        name: "Russian",
        native_name: "Русский",
        rtl: false,
    },
    KnownLanguage {
        code: "ar",
        name: "Arabic",
        native_name: "العربية",
        rtl: true,
    },
    KnownLanguage {
        code: "he",
        name: "Hebrew",
        native_name: "עברית",
        rtl: true,
    },
    KnownLanguage {
        code: "tr",
        name: "Turkish",
        native_name: "Türkçe",
        rtl: false,
    },
    KnownLanguage {
        code: "uk",
        name: "Ukrainian",
        native_name: "Українська",
        rtl: false,
    },
    KnownLanguage {
        code: "de",
        name: "German",
        native_name: "Deutsch",
        rtl: false,
    },
    KnownLanguage {
        code: "fr",
        name: "French",
        native_name: "Français",
        rtl: false,
    },
    KnownLanguage {
        code: "es",
        name: "Spanish",
        native_name: "Español",
        rtl: false,
    },
];

/// Look up presentation metadata for a language code.
pub fn known_language(code: &str) -> Option<&'static KnownLanguage> {
    KNOWN_LANGUAGES.iter().find(|lang| lang.code == code)
}
