use std::fmt;

use crate::i18n::registry::{self, LanguageConfig, LANGUAGES};

/// A display language known to be supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const PORTUGUESE: Language = Language { code: "pt" };

    /// `None` unless `code` is exactly a supported code.
    pub fn parse(code: &str) -> Option<Language> {
        registry::lookup(code).map(Language::from_config)
    }

    /// The fallback language for bilingual fields.
    pub fn canonical() -> Language {
        Language::from_config(registry::canonical())
    }

    /// Every supported language, in switcher order.
    pub fn all() -> impl Iterator<Item = Language> {
        LANGUAGES.iter().map(Language::from_config)
    }

    fn from_config(config: &'static LanguageConfig) -> Language {
        Language { code: config.code }
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn native_name(&self) -> &'static str {
        registry::lookup(self.code)
            .map(|config| config.native_name)
            .unwrap_or(self.code)
    }

    /// Name of the bilingual variant of `field` for this language,
    /// e.g. `title` -> `title_pt`.
    pub fn field_name(&self, field: &str) -> String {
        format!("{}_{}", field, self.code)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}
