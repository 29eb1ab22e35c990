//! Supported-language registry.
//!
//! The registry is an ordered set of languages with exactly one default.
//! It is built from configuration and handed to every operation that needs
//! it, so tests and deployments can vary the language set freely.

use crate::i18n::language::{is_well_formed, known_language, normalize_code};
use anyhow::{bail, Result};
use serde::Serialize;

/// Codes enabled when no explicit configuration is given.
pub const DEFAULT_LANGUAGE_CODES: &[&str] = &["en", "ka", "ru", "ar", "he"];

/// Default language when none is configured.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Configuration for a supported language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LanguageConfig {
    /// Normalized language code (e.g., "en", "ka")
    pub code: String,

    /// English name of the language (e.g., "Georgian")
    pub name: String,

    /// Native name of the language (e.g., "ქართული")
    pub native_name: String,

    /// Whether this is the fallback language (exactly one is)
    pub is_default: bool,

    /// Whether the language is written right-to-left
    pub rtl: bool,
}

impl LanguageConfig {
    /// Build a config for `code`, pulling names from the known-language table.
    ///
    /// Codes without metadata fall back to using the code as both names.
    pub fn for_code(code: &str, is_default: bool) -> Self {
        match known_language(code) {
            Some(known) => Self {
                code: known.code.to_string(),
                name: known.name.to_string(),
                native_name: known.native_name.to_string(),
                is_default,
                rtl: known.rtl,
            },
            None => Self {
                code: code.to_string(),
                name: code.to_string(),
                native_name: code.to_string(),
                is_default,
                rtl: false,
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

impl LanguageRegistry {
    /// Create a registry from explicit language configurations.
    ///
    /// Fails if the list is empty, contains malformed or duplicate codes, or
    /// does not mark exactly one language as default.
    pub fn new(languages: Vec<LanguageConfig>) -> Result<Self> {
        if languages.is_empty() {
            bail!("At least one supported language is required");
        }

        for (index, lang) in languages.iter().enumerate() {
            if !is_well_formed(&lang.code) {
                bail!("Invalid language code: '{}'", lang.code);
            }
            if languages[..index].iter().any(|other| other.code == lang.code) {
                bail!("Duplicate language code: '{}'", lang.code);
            }
        }

        match languages.iter().filter(|lang| lang.is_default).count() {
            0 => bail!("No default language found in registry"),
            1 => Ok(Self { languages }),
            _ => bail!("Multiple default languages found in registry"),
        }
    }

    /// Create a registry from a list of codes and the default code.
    ///
    /// Codes are normalized; the default must be one of them.
    pub fn from_codes<I, S>(codes: I, default_code: &str) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let default_code = normalize_code(default_code);
        let languages: Vec<LanguageConfig> = codes
            .into_iter()
            .map(|code| normalize_code(code.as_ref()))
            .filter(|code| !code.is_empty())
            .map(|code| {
                let is_default = code == default_code;
                LanguageConfig::for_code(&code, is_default)
            })
            .collect();

        if !languages.iter().any(|lang| lang.is_default) {
            bail!(
                "Default language '{}' is not in the supported language list",
                default_code
            );
        }

        Self::new(languages)
    }

    /// Get a language configuration by its code.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// All supported languages in configured order.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Supported language codes in configured order.
    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.languages.iter().map(|lang| lang.code.as_str())
    }

    pub fn len(&self) -> usize {
        self.languages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }

    /// The fallback language configuration.
    pub fn default_language(&self) -> &LanguageConfig {
        self.languages
            .iter()
            .find(|lang| lang.is_default)
            .expect("registry is constructed with exactly one default language")
    }

    /// Code of the fallback language.
    pub fn default_code(&self) -> &str {
        &self.default_language().code
    }

    pub fn is_supported(&self, code: &str) -> bool {
        self.get_by_code(code).is_some()
    }

    pub fn is_default(&self, code: &str) -> bool {
        self.default_code() == code
    }

    /// Position of a code in the configured order, if supported.
    pub fn position(&self, code: &str) -> Option<usize> {
        self.languages.iter().position(|lang| lang.code == code)
    }
}

impl Default for LanguageRegistry {
    fn default() -> Self {
        Self::from_codes(DEFAULT_LANGUAGE_CODES.iter().copied(), DEFAULT_LANGUAGE)
            .expect("built-in language list is valid")
    }
}
