//! Identity provider interface used by the session resolver and the auth handlers.
use async_trait::async_trait;

use super::types::{ProviderError, Session, SignUpOutcome, User};

/// Result type for identity provider calls.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// The external service of record for credentials and sessions.
///
/// Implementations must be cheap to share (`Arc<dyn IdentityProvider>` in state)
/// and must bound every call with their own timeout.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    // Provider name (for logging).
    fn backend_name(&self) -> &'static str;

    // Session check: who owns this access token?
    async fn get_user(&self, access_token: &str) -> ProviderResult<User>;

    // Exchange a refresh token for a new session.
    async fn refresh(&self, refresh_token: &str) -> ProviderResult<Session>;

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<Session>;

    // `redirect_to` is where the confirmation email sends the user.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> ProviderResult<SignUpOutcome>;

    // Revoke the session behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> ProviderResult<()>;

    async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> ProviderResult<()>;
}
