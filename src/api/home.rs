//! Localized payload for the home page.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};

use super::{AppState, LocaleContext};
use crate::i18n::{localized_field, Catalog, Language};
use crate::models::{EventDetails, NewsItem};
use crate::store::NewsQuery;

/// Featured items shown on the home page
pub const HOME_NEWS_LIMIT: u32 = 3;

#[derive(Debug, Serialize)]
pub struct NavLink {
    pub label: String,
    pub href: String,
}

/// Entry in the language switcher
#[derive(Debug, Serialize)]
pub struct LanguageOption {
    pub code: &'static str,
    pub label: &'static str,
    pub href: String,
    pub active: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedNews {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub publish_date: Option<NaiveDate>,
    pub image_url: Option<String>,
}

impl LocalizedNews {
    pub fn new(item: &NewsItem, language: Language) -> Self {
        Self {
            id: item.id.clone(),
            slug: item.slug.clone(),
            title: text(localized_field(item, "title", language)),
            content: text(localized_field(item, "content", language)),
            publish_date: item.publish_date,
            image_url: item.image.first().map(|image| image.url.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocalizedEvent {
    pub id: String,
    pub name: String,
    pub description: String,
    pub event_date: Option<DateTime<Utc>>,
    pub location: String,
    pub coordinates: Option<[f64; 2]>,
    /// e.g. "Join us on March 1, 2025 in São Paulo"
    pub summary: String,
}

impl LocalizedEvent {
    pub fn new(event: &EventDetails, language: Language, catalog: &Catalog) -> Self {
        let summary = match event.event_date {
            Some(date) => {
                let format = catalog.translate(language.code(), "format.date", &[]);
                let date = date.format(&format).to_string();
                catalog.translate(
                    language.code(),
                    "home.event_date",
                    &[("date", date.as_str()), ("location", event.location.as_str())],
                )
            }
            None => catalog.translate(language.code(), "home.no_event", &[]),
        };

        Self {
            id: event.id.clone(),
            name: text(localized_field(event, "name", language)),
            description: text(localized_field(event, "description", language)),
            event_date: event.event_date,
            location: event.location.clone(),
            coordinates: event.lat_lng().map(|(lat, lng)| [lat, lng]),
            summary,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HomePage {
    pub success: bool,
    pub locale: &'static str,
    pub site_name: Option<String>,
    pub headline: String,
    pub navigation: Vec<NavLink>,
    pub languages: Vec<LanguageOption>,
    pub featured_news: Vec<LocalizedNews>,
    pub event: Option<LocalizedEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

fn navigation(catalog: &Catalog, language: Language) -> Vec<NavLink> {
    [
        ("nav.home", ""),
        ("nav.news", "news"),
        ("nav.event", "event"),
        ("nav.apply", "apply"),
    ]
    .into_iter()
    .map(|(key, segment)| NavLink {
        label: catalog.translate(language.code(), key, &[]),
        href: format!("/{}/{}", language.code(), segment),
    })
    .collect()
}

/// Supported languages the site offers; all of them when the site lists none
/// (or could not be loaded).
fn language_options(site_languages: &[String], current: Language) -> Vec<LanguageOption> {
    let offered: Vec<Language> = Language::all()
        .filter(|lang| {
            site_languages.is_empty() || site_languages.iter().any(|code| code == lang.code())
        })
        .collect();
    let offered: Vec<Language> = if offered.is_empty() {
        Language::all().collect()
    } else {
        offered
    };

    offered
        .into_iter()
        .map(|lang| LanguageOption {
            code: lang.code(),
            label: lang.native_name(),
            href: format!("/{}/home", lang.code()),
            active: lang == current,
        })
        .collect()
}

/// `GET /home` and `GET /:lang/home`
///
/// Featured news and the event load together; if either fails both are
/// returned empty with an error message. A missing site record only drops
/// the site name.
pub async fn home(State(state): State<Arc<AppState>>, locale: LocaleContext) -> Json<HomePage> {
    let language = locale.language;
    let code = language.code();
    let site_id = &state.config.site_id;
    let featured = NewsQuery {
        featured: Some(true),
        limit: Some(HOME_NEWS_LIMIT),
        page: None,
    };

    let (site, news, event) = futures::future::join3(
        state.store.get_site_config(site_id),
        state.store.get_news(site_id, &featured),
        state.store.get_event_details(site_id),
    )
    .await;

    let (site_name, site_languages) = match site {
        Ok(site) => (Some(site.site_name), site.languages),
        Err(e) => {
            warn!("Home page without site config: {}", e);
            (None, Vec::new())
        }
    };

    let headline = match &site_name {
        Some(name) => state.catalog.translate(code, "home.welcome", &[("site", name.as_str())]),
        None => state.catalog.translate(code, "nav.home", &[]),
    };

    let (featured_news, event, error): (Vec<LocalizedNews>, Option<LocalizedEvent>, Option<String>) =
        match (news, event) {
            (Ok(news), Ok(event)) => (
                news.iter()
                    .map(|item| LocalizedNews::new(item, language))
                    .collect(),
                event.map(|event| LocalizedEvent::new(&event, language, &state.catalog)),
                None,
            ),
            (news, event) => {
                if let Err(e) = news {
                    error!("Error loading home page news: {}", e);
                }
                if let Err(e) = event {
                    error!("Error loading home page event: {}", e);
                }
                (
                    Vec::new(),
                    None,
                    Some(state.catalog.translate(code, "home.error", &[])),
                )
            }
        };

    Json(HomePage {
        success: error.is_none(),
        locale: code,
        site_name,
        headline,
        navigation: navigation(&state.catalog, language),
        languages: language_options(&site_languages, language),
        featured_news,
        event,
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> Catalog {
        Catalog::embedded().expect("Embedded locales should parse")
    }

    fn news_item() -> NewsItem {
        serde_json::from_value(json!({
            "id": "recNews1",
            "title_en": "Temple Reunion Announced",
            "title_pt": "Reunião do Templo Anunciada",
            "content_en": "We are excited",
            "slug": "temple-reunion-announced",
            "image": [{"url": "https://dl.airtable.com/a.jpg"}]
        }))
        .unwrap()
    }

    fn event() -> EventDetails {
        serde_json::from_value(json!({
            "id": "recEvent1",
            "name_en": "Temple Reunion 2025",
            "name_pt": "Reunião do Templo 2025",
            "description_en": "Annual event",
            "eventDate": "2025-03-01T18:00:00.000Z",
            "location": "São Paulo, Brazil",
            "coordinates": "-23.550520,-46.633308"
        }))
        .unwrap()
    }

    #[test]
    fn test_localized_news_portuguese_with_fallback() {
        let localized = LocalizedNews::new(&news_item(), Language::PORTUGUESE);
        assert_eq!(localized.title, "Reunião do Templo Anunciada");
        // No content_pt: English fallback
        assert_eq!(localized.content, "We are excited");
        assert_eq!(localized.image_url.as_deref(), Some("https://dl.airtable.com/a.jpg"));
    }

    #[test]
    fn test_localized_event_summary() {
        let catalog = catalog();

        let en = LocalizedEvent::new(&event(), Language::ENGLISH, &catalog);
        assert_eq!(en.name, "Temple Reunion 2025");
        assert_eq!(en.summary, "Join us on March 1, 2025 in São Paulo, Brazil");

        let pt = LocalizedEvent::new(&event(), Language::PORTUGUESE, &catalog);
        assert_eq!(pt.name, "Reunião do Templo 2025");
        assert_eq!(pt.description, "Annual event");
        assert_eq!(pt.summary, "Junte-se a nós em 01/03/2025 em São Paulo, Brazil");
        assert!(pt.coordinates.is_some());
    }

    #[test]
    fn test_localized_event_without_date() {
        let mut event = event();
        event.event_date = None;
        let localized = LocalizedEvent::new(&event, Language::ENGLISH, &catalog());
        assert_eq!(localized.summary, "Event details coming soon");
    }

    #[test]
    fn test_language_options_follow_site() {
        let options = language_options(&["pt".to_string()], Language::PORTUGUESE);
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "Português");
        assert_eq!(options[0].href, "/pt/home");
        assert!(options[0].active);
    }

    #[test]
    fn test_language_options_default_to_all() {
        let options = language_options(&[], Language::ENGLISH);
        let labels: Vec<_> = options.iter().map(|option| option.label).collect();
        assert_eq!(labels, vec!["English", "Português"]);
        assert!(options[0].active);
        assert!(!options[1].active);

        // Unsupported codes only: still offer the supported ones
        let options = language_options(&["fr".to_string()], Language::ENGLISH);
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_navigation_is_prefixed() {
        let links = navigation(&catalog(), Language::PORTUGUESE);
        assert_eq!(links[1].label, "Notícias");
        assert_eq!(links[1].href, "/pt/news");
    }
}
