//! HTTP surface: JSON endpoints over the record store plus the localized
//! home page.

mod error;
mod handlers;
mod home;
mod locale;

pub use error::{ApiError, ErrorBody};
pub use handlers::{ApiResponse, ApplicationsParams, NewsParams};
pub use home::{HomePage, LanguageOption, LocalizedEvent, LocalizedNews, NavLink, HOME_NEWS_LIMIT};
pub use locale::LocaleContext;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::i18n::{Catalog, Language};
use crate::store::RecordStore;

/// Shared state for every request
pub struct AppState {
    pub config: Config,
    pub store: RecordStore,
    pub catalog: Catalog,
    pub default_language: Language,
}

impl AppState {
    pub fn new(config: Config, store: RecordStore, catalog: Catalog) -> Self {
        let default_language = Language::parse(&config.default_locale).unwrap_or_else(|| {
            warn!(
                "Default locale '{}' is not supported, using {}",
                config.default_locale,
                Language::canonical()
            );
            Language::canonical()
        });

        Self {
            config,
            store,
            catalog,
            default_language,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/site-config", get(handlers::site_config))
        .route("/api/news", get(handlers::news))
        .route("/api/events", get(handlers::events))
        .route("/api/members", post(handlers::upsert_member))
        .route(
            "/api/applications",
            get(handlers::member_applications).post(handlers::submit_application),
        )
        .route("/home", get(home::home))
        .route("/:lang/home", get(home::home))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn app(server_uri: &str, api_key: Option<&str>) -> Router {
        let mut config = test_config(server_uri);
        config.api_key = api_key.map(String::from);
        let store = RecordStore::from_config(&config);
        let catalog = Catalog::embedded().expect("Embedded locales should parse");
        router(Arc::new(AppState::new(config, store, catalog)))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_unsupported_default_locale_falls_back() {
        let mut config = test_config("http://localhost:1");
        config.default_locale = "fr".to_string();
        let store = RecordStore::from_config(&config);
        let state = AppState::new(config, store, Catalog::embedded().unwrap());
        assert_eq!(state.default_language, Language::ENGLISH);
    }

    #[test]
    fn test_default_locale_from_config() {
        let mut config = test_config("http://localhost:1");
        config.default_locale = "pt".to_string();
        let store = RecordStore::from_config(&config);
        let state = AppState::new(config, store, Catalog::embedded().unwrap());
        assert_eq!(state.default_language, Language::PORTUGUESE);
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("http://localhost:1", None)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_site_config_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appConfig/Sites"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "records": [{"id": "recSite1", "fields": {"siteName": "Temple Reunion"}}]
            })))
            .mount(&server)
            .await;

        let response = app(&server.uri(), None)
            .oneshot(Request::builder().uri("/api/site-config").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], "recSite1");
        assert_eq!(body["data"]["siteName"], "Temple Reunion");
    }

    #[tokio::test]
    async fn test_events_null_when_missing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/appContent/Event"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"records": []})))
            .mount(&server)
            .await;

        let response = app(&server.uri(), None)
            .oneshot(Request::builder().uri("/api/events").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"success": true, "data": null}));
    }

    #[tokio::test]
    async fn test_news_bad_limit_is_400() {
        let response = app("http://localhost:1", None)
            .oneshot(Request::builder().uri("/api/news?limit=lots").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "limit must be a positive integer");
    }

    #[tokio::test]
    async fn test_members_requires_api_key() {
        let response = app("http://localhost:1", Some("secret"))
            .oneshot(
                Request::builder()
                    .uri("/api/members")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"email":"a@b.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["error"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_members_malformed_body_is_400() {
        let response = app("http://localhost:1", None)
            .oneshot(
                Request::builder()
                    .uri("/api/members")
                    .method("POST")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["success"], false);
    }

    #[tokio::test]
    async fn test_applications_requires_email() {
        let response = app("http://localhost:1", None)
            .oneshot(Request::builder().uri("/api/applications").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "email is required");
    }
}
