/*
 * Responsibility
 * - shared context attached to the Router (AppState)
 *   - auth mode (provider + resolver, or skip-auth), catalog, route policy, events
 * - Clone is cheap (everything behind Arc)
 */
use std::sync::Arc;

use url::Url;

use crate::error::AppError;
use crate::middleware::guard::policy::{Enforcement, RoutePolicy};
use crate::services::catalog::CatalogStore;
use crate::services::identity::IdentityProvider;
use crate::services::session::{CookieSettings, SessionEvents, SessionResolver};

/// Whether authentication is wired up.
#[derive(Clone)]
pub enum AuthMode {
    Enforced {
        provider: Arc<dyn IdentityProvider>,
        resolver: Arc<SessionResolver>,
    },
    /// Provider credentials absent or placeholders: nothing is enforced.
    Skip,
}

impl AuthMode {
    pub fn enforced(provider: Arc<dyn IdentityProvider>, resolver: SessionResolver) -> Self {
        Self::Enforced {
            provider,
            resolver: Arc::new(resolver),
        }
    }

    pub fn enforcement(&self) -> Enforcement {
        match self {
            Self::Enforced { .. } => Enforcement::Enforced,
            Self::Skip => Enforcement::SkipAuth,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthMode,
    pub catalog: Arc<dyn CatalogStore>,
    pub policy: Arc<RoutePolicy>,
    pub events: Arc<SessionEvents>,
    pub cookies: CookieSettings,
    pub public_base_url: Url,
}

impl AppState {
    pub fn new(
        auth: AuthMode,
        catalog: Arc<dyn CatalogStore>,
        policy: RoutePolicy,
        events: Arc<SessionEvents>,
        cookies: CookieSettings,
        public_base_url: Url,
    ) -> Self {
        Self {
            auth,
            catalog,
            policy: Arc::new(policy),
            events,
            cookies,
            public_base_url,
        }
    }

    /// The identity provider, or 503 when running in skip-auth mode.
    pub fn identity(&self) -> Result<&Arc<dyn IdentityProvider>, AppError> {
        match &self.auth {
            AuthMode::Enforced { provider, .. } => Ok(provider),
            AuthMode::Skip => Err(AppError::ServiceUnavailable {
                message: "authentication is not configured",
            }),
        }
    }

    /// Absolute URL on this site, for links the provider puts in emails.
    pub fn public_url(&self, path: &str) -> Result<Url, AppError> {
        self.public_base_url.join(path).map_err(|e| {
            tracing::error!(error = %e, path, "invalid public url");
            AppError::Internal
        })
    }
}
