//! UI message catalog with `{name}` placeholders.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::i18n::Language;

const EMBEDDED: &[(&str, &str)] = &[
    ("en", include_str!("../../locales/en.json")),
    ("pt", include_str!("../../locales/pt.json")),
];

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("valid placeholder regex"))
}

/// Per-locale dictionaries of message key -> text
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    dictionaries: HashMap<String, HashMap<String, String>>,
}

impl Catalog {
    /// Load the dictionaries shipped in `locales/`.
    pub fn embedded() -> Result<Self, serde_json::Error> {
        let mut catalog = Catalog::default();
        for (locale, source) in EMBEDDED {
            let dictionary: HashMap<String, String> = serde_json::from_str(source)?;
            catalog.insert(*locale, dictionary);
        }
        Ok(catalog)
    }

    pub fn insert(&mut self, locale: impl Into<String>, dictionary: HashMap<String, String>) {
        self.dictionaries.insert(locale.into(), dictionary);
    }

    /// Keys present in the canonical dictionary but missing from `locale`.
    pub fn missing_keys(&self, locale: &str) -> Vec<&str> {
        let canonical = Language::canonical().code();
        let Some(reference) = self.dictionaries.get(canonical) else {
            return Vec::new();
        };
        let target = self.dictionaries.get(locale);

        let mut missing: Vec<&str> = reference
            .keys()
            .filter(|key| target.map_or(true, |dict| !dict.contains_key(key.as_str())))
            .map(String::as_str)
            .collect();
        missing.sort_unstable();
        missing
    }

    /// Look up `key` for `locale` and substitute `vars`.
    ///
    /// Never fails: an unknown locale, an unknown key or an empty message all
    /// yield the key itself.
    pub fn translate(&self, locale: &str, key: &str, vars: &[(&str, &str)]) -> String {
        match self
            .dictionaries
            .get(locale)
            .and_then(|dictionary| dictionary.get(key))
            .filter(|text| !text.is_empty())
        {
            Some(text) => interpolate(text, vars),
            None => key.to_string(),
        }
    }
}

/// Replace every `{name}` with the matching variable; unknown tokens stay.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures| {
            let name = &caps[1];
            vars.iter()
                .find(|(var, _)| *var == name)
                .map(|(_, value)| value.to_string())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
