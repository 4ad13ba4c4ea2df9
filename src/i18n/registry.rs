//! Languages the site can display.

/// A supported display language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageConfig {
    /// ISO 639-1 code, also the suffix of bilingual fields (`title_pt`)
    pub code: &'static str,

    /// Label for the language switcher
    pub native_name: &'static str,
}

/// Supported languages in switcher order. The first entry is canonical:
/// bilingual fields always exist in it and it is the fallback.
pub const LANGUAGES: &[LanguageConfig] = &[
    LanguageConfig {
        code: "en",
        native_name: "English",
    },
    LanguageConfig {
        code: "pt",
        native_name: "Português",
    },
];

/// Find a supported language by its exact (lowercase) code.
pub fn lookup(code: &str) -> Option<&'static LanguageConfig> {
    LANGUAGES.iter().find(|lang| lang.code == code)
}

pub fn canonical() -> &'static LanguageConfig {
    &LANGUAGES[0]
}
