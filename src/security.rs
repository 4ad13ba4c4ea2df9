use axum::http::{header::AUTHORIZATION, HeaderMap};
use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
/// Use this for comparing API keys and other sensitive values
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") {
        Some(token.trim())
    } else {
        None
    }
}

/// Whether the request may use the write endpoints.
///
/// With no API key configured every request is allowed.
pub fn is_authorized(api_key: Option<&str>, headers: &HeaderMap) -> bool {
    match api_key {
        None => true,
        Some(expected) => bearer_token(headers)
            .map(|token| constant_time_compare(token, expected))
            .unwrap_or(false),
    }
}
