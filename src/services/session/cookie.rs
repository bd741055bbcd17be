/*
 * Responsibility
 * - read the session cookie from request headers
 * - build Set-Cookie values (write / clear)
 *
 * Cookie value: base64url(no pad) of JSON {access_token, refresh_token, expires_at}
 */
use axum::http::{
    HeaderMap, HeaderValue,
    header::{COOKIE, InvalidHeaderValue, SET_COOKIE},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::services::identity::Session;

pub const SESSION_COOKIE_NAME: &str = "storefront_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookieSettings {
    pub secure: bool,
    pub max_age_seconds: i64,
}

/// Tokens as stored in the browser. The user is not stored: it is re-read from
/// the provider on every check.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionCookie {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl SessionCookie {
    pub fn from_session(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
        }
    }

    pub fn encode(&self) -> String {
        // Serializing three plain fields cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    pub fn decode(raw: &str) -> Option<Self> {
        let bytes = URL_SAFE_NO_PAD.decode(raw.trim()).ok()?;
        let cookie: Self = serde_json::from_slice(&bytes).ok()?;
        if cookie.access_token.is_empty() || cookie.refresh_token.is_empty() {
            return None;
        }
        Some(cookie)
    }

    pub fn expires_within(&self, now: i64, margin_seconds: i64) -> bool {
        // expires_at comes from the client; any i64 is possible.
        self.expires_at.saturating_sub(now) <= margin_seconds
    }
}

impl std::fmt::Debug for SessionCookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCookie")
            .field("access_token", &token_fingerprint(&self.access_token))
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// First 8 bytes of SHA-256, hex. Safe to log.
pub fn token_fingerprint(token: &str) -> String {
    Sha256::digest(token.as_bytes())[..8]
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Find and decode the session cookie. Missing or garbled cookies read as `None`.
pub fn read_session_cookie(headers: &HeaderMap) -> Option<SessionCookie> {
    // HTTP/2 clients may split cookies across several headers.
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
        .and_then(|(_, value)| SessionCookie::decode(value))
}

/// True when a response already writes or clears the session cookie.
pub fn sets_session_cookie(headers: &HeaderMap) -> bool {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split_once('='))
        .any(|(name, _)| name.trim() == SESSION_COOKIE_NAME)
}

pub fn session_cookie(
    settings: &CookieSettings,
    cookie: &SessionCookie,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut header = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie.encode(),
        settings.max_age_seconds.max(0)
    );
    if settings.secure {
        header.push_str("; Secure");
    }
    HeaderValue::from_str(&header)
}

pub fn clear_session_cookie(settings: &CookieSettings) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut header = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if settings.secure {
        header.push_str("; Secure");
    }
    HeaderValue::from_str(&header)
}
