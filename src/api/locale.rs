use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::sync::Arc;

use super::AppState;
use crate::i18n::{resolve_locale, Language};

/// The display language resolved for the current request.
///
/// Built per request from the path prefix, then `Accept-Language`, then the
/// site default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocaleContext {
    pub language: Language,
}

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for LocaleContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let accept_language = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|value| value.to_str().ok());

        Ok(LocaleContext {
            language: resolve_locale(parts.uri.path(), accept_language, state.default_language),
        })
    }
}
