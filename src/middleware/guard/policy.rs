//! Route classification and the guard decision table.
//!
//! Pure functions only: no I/O, no session lookup. The middleware in
//! `route_guard.rs` feeds this module a path and whether a session was found.
//!
//! Decision table (evaluated top to bottom):
//!
//! | auth mode | session | class     | action                  |
//! |-----------|---------|-----------|-------------------------|
//! | skip      | any     | any       | Continue                |
//! | enforced  | yes     | AuthOnly  | RedirectTo(/dashboard)  |
//! | enforced  | no      | Protected | RedirectTo(/auth/login) |
//! | enforced  | any     | otherwise | Continue                |

use thiserror::Error;

use crate::services::identity::Session;

pub const DASHBOARD_PATH: &str = "/dashboard";
pub const LOGIN_PATH: &str = "/auth/login";

pub const PROTECTED_PREFIXES: &[&str] = &[DASHBOARD_PATH];
pub const AUTH_ONLY_PREFIXES: &[&str] = &[LOGIN_PATH, "/auth/signup"];

/// Paths the guard never looks at (static assets, favicon, framework internals).
pub const DEFAULT_EXCLUDED_PREFIXES: &[&str] = &[
    "/static/",
    "/assets/",
    "/favicon.ico",
    "/_next/static",
    "/_next/image",
];

/// Image requests are skipped wherever they live.
const EXCLUDED_EXTENSIONS: &[&str] = &[".svg", ".png", ".jpg", ".jpeg", ".gif", ".webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    AuthOnly,
    Protected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardAction {
    Continue,
    RedirectTo(&'static str),
}

/// Whether the guard enforces anything at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enforcement {
    Enforced,
    /// Provider credentials are not provisioned: every request passes.
    SkipAuth,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("route prefix must start with '/': {0:?}")]
    NotAbsolute(String),
    #[error("protected prefix {protected:?} overlaps auth-only prefix {auth_only:?}")]
    Overlap {
        protected: String,
        auth_only: String,
    },
}

/// Static prefix sets for one deployment.
///
/// The protected and auth-only sets are disjoint by construction: `new` refuses
/// any pair where one prefix is a prefix of the other, so a path can never land
/// in both classes and evaluation order does not matter.
#[derive(Debug, Clone)]
pub struct RoutePolicy {
    protected: Vec<String>,
    auth_only: Vec<String>,
    excluded: Vec<String>,
}

impl RoutePolicy {
    pub fn new<P, A, E>(protected: P, auth_only: A, excluded: E) -> Result<Self, PolicyError>
    where
        P: IntoIterator,
        P::Item: Into<String>,
        A: IntoIterator,
        A::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        let protected = absolute_prefixes(protected)?;
        let auth_only = absolute_prefixes(auth_only)?;
        let excluded = absolute_prefixes(excluded)?;

        for p in &protected {
            for a in &auth_only {
                if p.starts_with(a.as_str()) || a.starts_with(p.as_str()) {
                    return Err(PolicyError::Overlap {
                        protected: p.clone(),
                        auth_only: a.clone(),
                    });
                }
            }
        }

        Ok(Self {
            protected,
            auth_only,
            excluded,
        })
    }

    /// Default protected/auth-only sets with a custom exclusion list.
    pub fn with_excluded<E>(excluded: E) -> Result<Self, PolicyError>
    where
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self::new(
            PROTECTED_PREFIXES.iter().copied(),
            AUTH_ONLY_PREFIXES.iter().copied(),
            excluded,
        )
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        if self.excluded.iter().any(|prefix| path.starts_with(prefix.as_str())) {
            return true;
        }
        // Case-sensitive like the prefixes: `/logo.PNG` is not an asset.
        EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        let matches = |prefixes: &[String]| prefixes.iter().any(|p| path.starts_with(p.as_str()));

        if matches(self.protected.as_slice()) {
            RouteClass::Protected
        } else if matches(self.auth_only.as_slice()) {
            RouteClass::AuthOnly
        } else {
            RouteClass::Public
        }
    }

    pub fn decide(&self, path: &str, has_session: bool) -> GuardAction {
        match (self.classify(path), has_session) {
            (RouteClass::AuthOnly, true) => GuardAction::RedirectTo(DASHBOARD_PATH),
            (RouteClass::Protected, false) => GuardAction::RedirectTo(LOGIN_PATH),
            _ => GuardAction::Continue,
        }
    }
}

impl Default for RoutePolicy {
    fn default() -> Self {
        let owned = |items: &[&str]| -> Vec<String> { items.iter().map(|s| s.to_string()).collect() };
        Self {
            protected: owned(PROTECTED_PREFIXES),
            auth_only: owned(AUTH_ONLY_PREFIXES),
            excluded: owned(DEFAULT_EXCLUDED_PREFIXES),
        }
    }
}

/// Full guard decision for a path, including skip-auth mode.
pub fn guard(
    policy: &RoutePolicy,
    enforcement: Enforcement,
    path: &str,
    session: Option<&Session>,
) -> GuardAction {
    match enforcement {
        Enforcement::SkipAuth => GuardAction::Continue,
        Enforcement::Enforced => policy.decide(path, session.is_some()),
    }
}

fn absolute_prefixes<I>(items: I) -> Result<Vec<String>, PolicyError>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .map(|prefix: String| {
            if prefix.starts_with('/') {
                Ok(prefix)
            } else {
                Err(PolicyError::NotAbsolute(prefix))
            }
        })
        .collect()
}
