//! Cookie parsing utilities for the access gate.
//!
//! Inbound credentials are read from the request `Cookie` header. Cookies the
//! auth service hands out during a refresh exchange are parsed from its
//! `Set-Cookie` headers and re-issued to the browser with our own attributes.

use axum::http::{HeaderMap, HeaderValue, header};

/// Cookie name for the bearer token sent to the profile endpoint.
pub const AUTH_COOKIE_NAME: &str = "auth_token";

/// Cookie name for the token forwarded to the refresh endpoint.
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// A cookie received from the auth service, stripped of its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardedCookie {
    pub name: String,
    pub value: String,
}

impl ForwardedCookie {
    /// Render as a `Set-Cookie` value scoped to the whole site.
    pub fn to_header_value(&self, secure: bool) -> Option<HeaderValue> {
        let secure = if secure { "; Secure" } else { "" };
        let cookie = format!(
            "{}={}; HttpOnly; SameSite=Lax; Path=/{}",
            self.name, self.value, secure
        );
        HeaderValue::from_str(&cookie).ok()
    }
}

/// Parse one upstream `Set-Cookie` header value.
///
/// The value may hold several cookies joined by commas. Each segment keeps only
/// the part before its first `;`, which is then split at the first `=`.
/// Segments without a name or a value are skipped, which also discards the
/// tail of an `Expires=` date that happens to contain a comma.
pub fn parse_set_cookie(value: &str) -> Vec<ForwardedCookie> {
    value
        .split(',')
        .filter_map(|segment| {
            let pair = segment.split_once(';').map_or(segment, |(pair, _)| pair);
            let (name, value) = pair.split_once('=')?;
            let (name, value) = (name.trim(), value.trim());
            if name.is_empty() || value.is_empty() {
                return None;
            }
            Some(ForwardedCookie {
                name: name.to_string(),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Append forwarded cookies to an outgoing response's headers.
pub fn append_cookies(headers: &mut HeaderMap, cookies: &[ForwardedCookie], secure: bool) {
    for cookie in cookies {
        match cookie.to_header_value(secure) {
            Some(value) => {
                headers.append(header::SET_COOKIE, value);
            }
            None => tracing::warn!(name = %cookie.name, "Dropping cookie with invalid characters"),
        }
    }
}
