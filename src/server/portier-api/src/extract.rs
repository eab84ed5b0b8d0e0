//! Locating the presented session token.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum_extra::extract::cookie::CookieJar;

/// Name of the session cookie set by the login form.
pub const AUTH_COOKIE: &str = "auth_token";

/// Returns the token from an `Authorization: Bearer` header, or failing that
/// from the [`AUTH_COOKIE`] cookie.
pub fn presented_token(headers: &HeaderMap, jar: &CookieJar) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            let (scheme, token) = v.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then(|| token.trim())
        })
        .filter(|t| !t.is_empty());

    match bearer {
        Some(token) => Some(token.to_string()),
        None => jar.get(AUTH_COOKIE).map(|c| c.value().to_string()),
    }
}
