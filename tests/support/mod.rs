//! Shared fixtures for the router-level tests: an in-process identity provider
//! with call counters, a small catalog, and request/response helpers.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Request, Response, header},
};
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;
use uuid::Uuid;

use storefront::app;
use storefront::middleware::guard::RoutePolicy;
use storefront::services::catalog::{InMemoryCatalog, Product};
use storefront::services::identity::{
    IdentityProvider, ProviderError, ProviderResult, Session, SignUpOutcome, User,
};
use storefront::services::session::cookie::SESSION_COOKIE_NAME;
use storefront::services::session::{
    CookieSettings, ResolverSettings, SessionCookie, SessionEvents, SessionResolver,
};
use storefront::state::{AppState, AuthMode};

pub const GOOD_PASSWORD: &str = "correct-horse";
pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const CONFIRM_EMAIL: &str = "confirm@example.com";
pub const RESOLVER_TIMEOUT: Duration = Duration::from_millis(100);

/// How the fake answers session checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Accept,
    Reject,
    Hang,
}

#[derive(Debug)]
pub struct FakeIdentity {
    pub mode: SessionMode,
    pub get_user_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub sign_in_calls: AtomicUsize,
    pub sign_up_calls: AtomicUsize,
    pub sign_out_calls: AtomicUsize,
    pub reset_calls: AtomicUsize,
}

impl FakeIdentity {
    pub fn new(mode: SessionMode) -> Arc<Self> {
        Arc::new(Self {
            mode,
            get_user_calls: AtomicUsize::new(0),
            refresh_calls: AtomicUsize::new(0),
            sign_in_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            reset_calls: AtomicUsize::new(0),
        })
    }

    pub fn session_checks(&self) -> usize {
        self.get_user_calls.load(Ordering::SeqCst) + self.refresh_calls.load(Ordering::SeqCst)
    }

    async fn session_answer<T>(&self, ok: T) -> ProviderResult<T> {
        match self.mode {
            SessionMode::Accept => Ok(ok),
            SessionMode::Reject => Err(ProviderError::rejected(401, "invalid JWT")),
            SessionMode::Hang => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(ok)
            }
        }
    }
}

pub fn user(email: &str) -> User {
    User {
        id: Uuid::from_u128(42),
        email: email.into(),
        last_sign_in_at: None,
    }
}

pub fn session_for(email: &str) -> Session {
    Session {
        access_token: "fresh-access".into(),
        refresh_token: "fresh-refresh".into(),
        expires_at: Utc::now().timestamp() + 3600,
        user: user(email),
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn get_user(&self, _access_token: &str) -> ProviderResult<User> {
        self.get_user_calls.fetch_add(1, Ordering::SeqCst);
        self.session_answer(user("ada@example.com")).await
    }

    async fn refresh(&self, _refresh_token: &str) -> ProviderResult<Session> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        self.session_answer(session_for("ada@example.com")).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<Session> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        match password {
            GOOD_PASSWORD => Ok(session_for(email)),
            "unconfirmed" => Err(ProviderError::rejected(400, "Email not confirmed")),
            "boom" => Err(ProviderError::rejected(400, "Database error querying schema")),
            _ => Err(ProviderError::rejected(400, "Invalid login credentials")),
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        redirect_to: Option<&str>,
    ) -> ProviderResult<SignUpOutcome> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(redirect_to, Some("http://localhost:3000/auth/callback"));
        match email {
            TAKEN_EMAIL => Err(ProviderError::rejected(422, "User already registered")),
            CONFIRM_EMAIL => Ok(SignUpOutcome {
                user: user(email),
                session: None,
            }),
            _ => Ok(SignUpOutcome {
                user: user(email),
                session: Some(session_for(email)),
            }),
        }
    }

    async fn sign_out(&self, _access_token: &str) -> ProviderResult<()> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Unavailable("connection reset".into()))
    }

    async fn reset_password(&self, _email: &str, redirect_to: Option<&str>) -> ProviderResult<()> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        assert_eq!(redirect_to, Some("http://localhost:3000/auth/reset-password"));
        Ok(())
    }
}

pub fn catalog() -> InMemoryCatalog {
    InMemoryCatalog::new(vec![
        Product {
            id: 2,
            name: "Mug".into(),
            description: None,
            price: 8.0,
            color: Some("blue".into()),
        },
        Product {
            id: 1,
            name: "Lamp".into(),
            description: Some("Warm light".into()),
            price: 19.5,
            color: None,
        },
    ])
}

fn cookies() -> CookieSettings {
    CookieSettings {
        secure: false,
        max_age_seconds: 3600,
    }
}

fn base_url() -> Url {
    Url::parse("http://localhost:3000").unwrap()
}

pub fn enforced_app(provider: Arc<FakeIdentity>) -> Router {
    let events = Arc::new(SessionEvents::new());
    let resolver = SessionResolver::new(
        provider.clone(),
        events.clone(),
        ResolverSettings {
            timeout: RESOLVER_TIMEOUT,
            refresh_margin_seconds: 60,
            cookies: cookies(),
        },
    );
    let state = AppState::new(
        AuthMode::enforced(provider, resolver),
        Arc::new(catalog()),
        RoutePolicy::default(),
        events,
        cookies(),
        base_url(),
    );
    app::router(state)
}

pub fn skip_auth_app() -> Router {
    let state = AppState::new(
        AuthMode::Skip,
        Arc::new(catalog()),
        RoutePolicy::default(),
        Arc::new(SessionEvents::new()),
        cookies(),
        base_url(),
    );
    app::router(state)
}

/// `Cookie` header value for a session expiring `expires_in` seconds from now.
pub fn session_cookie(expires_in: i64) -> String {
    let cookie = SessionCookie {
        access_token: "old-access".into(),
        refresh_token: "old-refresh".into(),
        expires_at: Utc::now().timestamp() + expires_in,
    };
    format!("{SESSION_COOKIE_NAME}={}", cookie.encode())
}

pub fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn post_json(path: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

pub fn set_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok().map(str::to_string))
        .collect()
}
