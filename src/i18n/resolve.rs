//! Locale resolution for an incoming request.

use regex::Regex;
use std::sync::OnceLock;

use crate::i18n::Language;

/// Leading two-letter segment: `/pt/news`, `/pt/` or `/pt`
fn path_locale_regex() -> &'static Regex {
    static PATH_LOCALE: OnceLock<Regex> = OnceLock::new();
    PATH_LOCALE.get_or_init(|| Regex::new(r"^/([a-z]{2})(?:/|$)").expect("valid path locale regex"))
}

/// Resolve the display language for a request.
///
/// Resolution order (first match wins):
/// 1. A supported two-letter code as the first path segment
/// 2. The client's `Accept-Language` preferences, by weight, reduced to the
///    primary subtag
/// 3. `default`
pub fn resolve_locale(path: &str, accept_language: Option<&str>, default: Language) -> Language {
    if let Some(language) = locale_from_path(path) {
        return language;
    }

    accept_language
        .and_then(locale_from_accept_language)
        .unwrap_or(default)
}

/// The language named by the first path segment, if supported.
pub fn locale_from_path(path: &str) -> Option<Language> {
    let captures = path_locale_regex().captures(path)?;
    Language::parse(captures.get(1)?.as_str())
}

/// The most preferred supported language in an `Accept-Language` header.
pub fn locale_from_accept_language(header: &str) -> Option<Language> {
    preferred_languages(header)
        .into_iter()
        .find_map(|code| Language::parse(&code))
}

/// Primary subtags from an `Accept-Language` header, highest weight first.
///
/// Entries with `q=0` or a weight that is not a number in `0..=1` are
/// dropped; equal weights keep header order.
pub fn preferred_languages(header: &str) -> Vec<String> {
    let mut weighted: Vec<(f32, String)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() || tag == "*" {
                return None;
            }

            let weight = match parts.find_map(|param| param.trim().strip_prefix("q=")) {
                None => 1.0,
                Some(q) => parse_weight(q)?,
            };
            if weight == 0.0 {
                return None;
            }

            let primary = tag.split(['-', '_']).next()?.to_ascii_lowercase();
            Some((weight, primary))
        })
        .collect();

    weighted.sort_by(|a, b| b.0.total_cmp(&a.0));
    weighted.into_iter().map(|(_, code)| code).collect()
}

/// A finite weight in `0.0..=1.0`; NaN and infinities fail the range check.
fn parse_weight(q: &str) -> Option<f32> {
    q.trim()
        .parse::<f32>()
        .ok()
        .filter(|weight| (0.0..=1.0).contains(weight))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EN: Language = Language::ENGLISH;
    const PT: Language = Language::PORTUGUESE;

    // ==================== Path Tests ====================

    #[test]
    fn test_path_prefix_wins() {
        assert_eq!(resolve_locale("/pt/news", Some("en-US"), EN), PT);
    }

    #[test]
    fn test_bare_prefix() {
        assert_eq!(locale_from_path("/pt"), Some(PT));
        assert_eq!(locale_from_path("/pt/"), Some(PT));
    }

    #[test]
    fn test_unsupported_prefix_falls_through_to_browser() {
        assert_eq!(resolve_locale("/xx/news", Some("pt-BR"), EN), PT);
    }

    #[test]
    fn test_unsupported_prefix_falls_through_to_default() {
        assert_eq!(resolve_locale("/xx/news", None, EN), EN);
        assert_eq!(resolve_locale("/xx/news", None, PT), PT);
    }

    #[test]
    fn test_longer_segment_is_not_a_locale() {
        assert_eq!(locale_from_path("/ptx/news"), None);
        assert_eq!(locale_from_path("/news"), None);
        assert_eq!(locale_from_path("/PT/news"), None);
        assert_eq!(locale_from_path(""), None);
    }

    // ==================== Accept-Language Tests ====================

    #[test]
    fn test_primary_subtag() {
        assert_eq!(locale_from_accept_language("pt-BR"), Some(PT));
        assert_eq!(locale_from_accept_language("en_GB"), Some(EN));
    }

    #[test]
    fn test_weights_order_candidates() {
        assert_eq!(
            preferred_languages("en;q=0.5, pt-BR;q=0.9, fr"),
            vec!["fr", "pt", "en"]
        );
        assert_eq!(locale_from_accept_language("en;q=0.5, pt-BR;q=0.9, fr"), Some(PT));
    }

    #[test]
    fn test_zero_weight_is_ignored() {
        assert_eq!(locale_from_accept_language("pt;q=0, de"), None);
        assert_eq!(resolve_locale("/", Some("pt;q=0"), EN), EN);
    }

    #[test]
    fn test_wildcard_and_garbage() {
        assert!(preferred_languages("*").is_empty());
        assert!(preferred_languages("").is_empty());
        assert!(preferred_languages("pt;q=abc").is_empty());
    }

    #[test]
    fn test_no_header_uses_default() {
        assert_eq!(resolve_locale("/news", None, PT), PT);
    }

    #[test]
    fn test_non_finite_or_out_of_range_weights_are_dropped() {
        assert_eq!(
            preferred_languages("pt;q=0.9, fr;q=NaN, en;q=inf"),
            vec!["pt"]
        );
        assert_eq!(preferred_languages("fr;q=2, de;q=-0.5, pt;q=0.3"), vec!["pt"]);
        assert_eq!(locale_from_accept_language("en;q=0.1, pt;q=NaN"), Some(EN));
    }
}
