//! CORS for browser front-ends hosted on another origin.
//!
//! The session lives in an HttpOnly cookie, so cross-origin calls to
//! `/api/v1/auth/...` only work with credentials. Credentials are never combined
//! with a wildcard or mirrored origin:
//! - Production: exact-match allowlist from `CORS_ALLOWED_ORIGINS`; an empty
//!   list sends no CORS headers at all.
//! - Development: the same allowlist, plus any loopback origin
//!   (`localhost`, `127.0.0.1`, `[::1]`) on any port.

use std::time::Duration;

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};
use url::{Host, Url};

use crate::config::Config;

pub fn apply(router: Router, config: &Config) -> Router {
    let allowed: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    let allow_loopback = !config.app_env.is_production();

    let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
        allowed.contains(origin) || (allow_loopback && is_loopback_origin(origin))
    });

    let cors = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(Duration::from_secs(60 * 10));

    router.layer(cors)
}

fn is_loopback_origin(origin: &HeaderValue) -> bool {
    let Some(url) = origin.to_str().ok().and_then(|s| Url::parse(s).ok()) else {
        return false;
    };
    if !matches!(url.scheme(), "http" | "https") {
        return false;
    }
    match url.host() {
        Some(Host::Domain(domain)) => domain == "localhost",
        Some(Host::Ipv4(ip)) => ip.is_loopback(),
        Some(Host::Ipv6(ip)) => ip.is_loopback(),
        None => false,
    }
}
