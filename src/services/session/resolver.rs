//! Session resolver: request cookies → provider-verified session.
//!
//! - `try_resolve` reports provider outages so the guard can decide how to fail.
//! - `resolve` never fails: outages read as "no session" with a warning.
//!
//! Every provider interaction for one request runs under a single timeout.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, header::InvalidHeaderValue};
use chrono::Utc;
use thiserror::Error;

use crate::services::identity::{IdentityProvider, ProviderError, Session, User};
use crate::services::session::cookie::{
    CookieSettings, SessionCookie, clear_session_cookie, read_session_cookie, session_cookie,
    token_fingerprint,
};
use crate::services::session::events::{SessionEvent, SessionEvents};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("session check timed out after {0:?}")]
    Timeout(Duration),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("refreshed session cookie could not be encoded: {0}")]
    Cookie(#[from] InvalidHeaderValue),
}

/// Outcome of resolving one request.
#[derive(Debug, Default)]
pub struct Resolution {
    pub session: Option<Session>,
    /// Cookie rewrite for the outgoing response (refresh or clear).
    pub set_cookie: Option<HeaderValue>,
}

impl Resolution {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub timeout: Duration,
    /// Refresh when the access token expires within this many seconds.
    pub refresh_margin_seconds: i64,
    pub cookies: CookieSettings,
}

#[derive(Clone)]
pub struct SessionResolver {
    provider: Arc<dyn IdentityProvider>,
    events: Arc<SessionEvents>,
    settings: ResolverSettings,
}

impl std::fmt::Debug for SessionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionResolver")
            .field("provider", &self.provider.backend_name())
            .field("settings", &self.settings)
            .finish()
    }
}

impl SessionResolver {
    pub fn new(
        provider: Arc<dyn IdentityProvider>,
        events: Arc<SessionEvents>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            provider,
            events,
            settings,
        }
    }

    /// Infallible variant: provider failures are logged and read as "no session".
    pub async fn resolve(&self, headers: &HeaderMap) -> Resolution {
        match self.try_resolve(headers).await {
            Ok(resolution) => resolution,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    provider = self.provider.backend_name(),
                    "session resolution failed; treating request as unauthenticated"
                );
                Resolution::anonymous()
            }
        }
    }

    pub async fn try_resolve(&self, headers: &HeaderMap) -> Result<Resolution, ResolveError> {
        // No cookie, no provider call.
        let Some(cookie) = read_session_cookie(headers) else {
            return Ok(Resolution::anonymous());
        };

        match tokio::time::timeout(self.settings.timeout, self.check(cookie)).await {
            Ok(result) => result,
            Err(_) => Err(ResolveError::Timeout(self.settings.timeout)),
        }
    }

    async fn check(&self, cookie: SessionCookie) -> Result<Resolution, ResolveError> {
        let now = Utc::now().timestamp();

        if cookie.expires_within(now, self.settings.refresh_margin_seconds) {
            return self.refresh(cookie).await;
        }

        match self.provider.get_user(&cookie.access_token).await {
            Ok(user) => Ok(Resolution {
                session: Some(Session {
                    access_token: cookie.access_token,
                    refresh_token: cookie.refresh_token,
                    expires_at: cookie.expires_at,
                    user,
                }),
                set_cookie: None,
            }),
            Err(err) if err.is_rejection() => self.rejected(&cookie, err),
            Err(err) => Err(err.into()),
        }
    }

    async fn refresh(&self, cookie: SessionCookie) -> Result<Resolution, ResolveError> {
        match self.provider.refresh(&cookie.refresh_token).await {
            Ok(session) => {
                let header =
                    session_cookie(&self.settings.cookies, &SessionCookie::from_session(&session))?;
                tracing::debug!(
                    user_id = %session.user.id,
                    expires_at = session.expires_at,
                    "session refreshed"
                );
                self.events
                    .publish(&SessionEvent::Refreshed(session.user.clone()));
                Ok(Resolution {
                    session: Some(session),
                    set_cookie: Some(header),
                })
            }
            Err(err) if err.is_rejection() => self.rejected(&cookie, err),
            Err(err) => Err(err.into()),
        }
    }

    fn rejected(&self, cookie: &SessionCookie, err: ProviderError) -> Result<Resolution, ResolveError> {
        tracing::debug!(
            token = %token_fingerprint(&cookie.access_token),
            error = %err,
            "session rejected by identity provider; clearing cookie"
        );
        Ok(Resolution {
            session: None,
            set_cookie: Some(clear_session_cookie(&self.settings.cookies)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::header::COOKIE;
    use uuid::Uuid;

    use super::*;
    use crate::services::identity::{ProviderResult, SignUpOutcome};
    use crate::services::session::cookie::SESSION_COOKIE_NAME;
    use crate::services::session::events::SessionObserver;

    #[derive(Clone, Copy)]
    enum Mode {
        Accept,
        Reject,
        Down,
        Hang,
    }

    struct StubProvider {
        mode: Mode,
        get_user_calls: AtomicUsize,
        refresh_calls: AtomicUsize,
    }

    impl StubProvider {
        fn new(mode: Mode) -> Arc<Self> {
            Arc::new(Self {
                mode,
                get_user_calls: AtomicUsize::new(0),
                refresh_calls: AtomicUsize::new(0),
            })
        }

        async fn answer<T>(&self, ok: T) -> ProviderResult<T> {
            match self.mode {
                Mode::Accept => Ok(ok),
                Mode::Reject => Err(ProviderError::rejected(401, "invalid JWT")),
                Mode::Down => Err(ProviderError::rejected(503, "upstream connect error")),
                Mode::Hang => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(ok)
                }
            }
        }
    }

    fn user() -> User {
        User {
            id: Uuid::from_u128(7),
            email: "ada@example.com".into(),
            last_sign_in_at: None,
        }
    }

    #[async_trait]
    impl IdentityProvider for StubProvider {
        fn backend_name(&self) -> &'static str {
            "stub"
        }

        async fn get_user(&self, _access_token: &str) -> ProviderResult<User> {
            self.get_user_calls.fetch_add(1, Ordering::SeqCst);
            self.answer(user()).await
        }

        async fn refresh(&self, _refresh_token: &str) -> ProviderResult<Session> {
            self.refresh_calls.fetch_add(1, Ordering::SeqCst);
            self.answer(Session {
                access_token: "fresh-access".into(),
                refresh_token: "fresh-refresh".into(),
                expires_at: Utc::now().timestamp() + 3600,
                user: user(),
            })
            .await
        }

        async fn sign_in(&self, _: &str, _: &str) -> ProviderResult<Session> {
            unreachable!("resolver never signs in")
        }

        async fn sign_up(&self, _: &str, _: &str, _: Option<&str>) -> ProviderResult<SignUpOutcome> {
            unreachable!("resolver never signs up")
        }

        async fn sign_out(&self, _: &str) -> ProviderResult<()> {
            unreachable!("resolver never signs out")
        }

        async fn reset_password(&self, _: &str, _: Option<&str>) -> ProviderResult<()> {
            unreachable!("resolver never resets passwords")
        }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<&'static str>>);

    impl SessionObserver for Recorder {
        fn on_session_event(&self, event: &SessionEvent) {
            self.0.lock().unwrap().push(event.name());
        }
    }

    fn resolver(provider: Arc<StubProvider>, recorder: Arc<Recorder>) -> SessionResolver {
        SessionResolver::new(
            provider,
            Arc::new(SessionEvents::new().with_observer(recorder)),
            ResolverSettings {
                timeout: Duration::from_millis(50),
                refresh_margin_seconds: 60,
                cookies: CookieSettings {
                    secure: false,
                    max_age_seconds: 3600,
                },
            },
        )
    }

    fn headers_with(expires_in: i64) -> HeaderMap {
        let cookie = SessionCookie {
            access_token: "old-access".into(),
            refresh_token: "old-refresh".into(),
            expires_at: Utc::now().timestamp() + expires_in,
        };
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE_NAME}={}", cookie.encode())).unwrap(),
        );
        headers
    }

    #[tokio::test]
    async fn no_cookie_means_no_provider_call() {
        let provider = StubProvider::new(Mode::Accept);
        let resolver = resolver(provider.clone(), Arc::default());

        let resolution = resolver.try_resolve(&HeaderMap::new()).await.unwrap();
        assert!(resolution.session.is_none());
        assert!(resolution.set_cookie.is_none());
        assert_eq!(provider.get_user_calls.load(Ordering::SeqCst), 0);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn valid_token_is_checked_not_refreshed() {
        let provider = StubProvider::new(Mode::Accept);
        let resolver = resolver(provider.clone(), Arc::default());

        let resolution = resolver.try_resolve(&headers_with(3600)).await.unwrap();
        let session = resolution.session.as_ref().unwrap();
        assert_eq!(session.access_token, "old-access");
        assert_eq!(resolution.user().unwrap().email, "ada@example.com");
        assert!(resolution.set_cookie.is_none());
        assert_eq!(provider.get_user_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expiring_token_is_refreshed_and_cookie_rewritten() {
        let provider = StubProvider::new(Mode::Accept);
        let recorder = Arc::new(Recorder::default());
        let resolver = resolver(provider.clone(), recorder.clone());

        let resolution = resolver.try_resolve(&headers_with(10)).await.unwrap();
        assert_eq!(resolution.session.unwrap().access_token, "fresh-access");

        let rewritten = resolution.set_cookie.unwrap();
        let rewritten = rewritten.to_str().unwrap();
        let value = rewritten
            .strip_prefix(&format!("{SESSION_COOKIE_NAME}="))
            .and_then(|rest| rest.split(';').next())
            .unwrap();
        let decoded = SessionCookie::decode(value).unwrap();
        assert_eq!(decoded.access_token, "fresh-access");
        assert_eq!(decoded.refresh_token, "fresh-refresh");

        assert_eq!(provider.refresh_calls.load(Ordering::SeqCst), 1);
        assert_eq!(provider.get_user_calls.load(Ordering::SeqCst), 0);
        assert_eq!(*recorder.0.lock().unwrap(), vec!["refreshed"]);
    }

    #[tokio::test]
    async fn rejected_token_clears_cookie() {
        let resolver = resolver(StubProvider::new(Mode::Reject), Arc::default());

        let resolution = resolver.try_resolve(&headers_with(3600)).await.unwrap();
        assert!(resolution.session.is_none());
        let cleared = resolution.set_cookie.unwrap();
        assert!(cleared.to_str().unwrap().contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn outage_is_an_error_for_try_resolve_and_anonymous_for_resolve() {
        let resolver = resolver(StubProvider::new(Mode::Down), Arc::default());

        let err = resolver.try_resolve(&headers_with(3600)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Provider(_)));

        let resolution = resolver.resolve(&headers_with(3600)).await;
        assert!(resolution.session.is_none());
        assert!(resolution.set_cookie.is_none());
    }

    #[tokio::test]
    async fn slow_provider_times_out() {
        let resolver = resolver(StubProvider::new(Mode::Hang), Arc::default());

        let err = resolver.try_resolve(&headers_with(3600)).await.unwrap_err();
        assert!(matches!(err, ResolveError::Timeout(d) if d == Duration::from_millis(50)));
    }
}
