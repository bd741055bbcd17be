use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use super::client::{IdentityProvider, ProviderResult};
use super::types::{ProviderError, Session, SignUpOutcome, User};
use crate::services::backend::{self, BackendEndpoint};

/// Identity provider backed by a GoTrue-compatible auth API (`/auth/v1`).
///
/// Only the password grant, refresh grant and the handful of account endpoints
/// the storefront needs are implemented.
#[derive(Clone)]
pub struct GoTrueClient {
    endpoint: BackendEndpoint,
}

/// Token grant response body.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self) -> Session {
        let expires_at = self
            .expires_at
            .or_else(|| self.expires_in.map(|secs| Utc::now().timestamp().saturating_add(secs)))
            .unwrap_or_else(|| Utc::now().timestamp());

        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        }
    }
}

impl GoTrueClient {
    pub fn new(base_url: &Url, anon_key: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let endpoint = BackendEndpoint::new(base_url, anon_key, timeout)?;
        Ok(Self { endpoint })
    }

    fn url(&self, path: &str) -> ProviderResult<Url> {
        self.endpoint
            .url(path)
            .map_err(|e| ProviderError::Unavailable(format!("invalid provider url: {e}")))
    }

    fn token_url(&self, grant_type: &str) -> ProviderResult<Url> {
        let mut url = self.url("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", grant_type);
        Ok(url)
    }

    fn with_redirect(mut url: Url, redirect_to: Option<&str>) -> Url {
        if let Some(redirect_to) = redirect_to {
            url.query_pairs_mut().append_pair("redirect_to", redirect_to);
        }
        url
    }
}

async fn ensure_success(response: Response) -> ProviderResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    // Error bodies are best-effort: an HTML 502 from a proxy must still map to Rejected.
    let body: Value = response.json().await.unwrap_or(Value::Null);
    Err(ProviderError::rejected(
        status.as_u16(),
        backend::error_message(&body),
    ))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ProviderResult<T> {
    let response = ensure_success(response).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

#[async_trait]
impl IdentityProvider for GoTrueClient {
    fn backend_name(&self) -> &'static str {
        "gotrue"
    }

    async fn get_user(&self, access_token: &str) -> ProviderResult<User> {
        let url = self.url("auth/v1/user")?;
        let response = self
            .endpoint
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        read_json(response).await
    }

    async fn refresh(&self, refresh_token: &str) -> ProviderResult<Session> {
        let url = self.token_url("refresh_token")?;
        let response = self
            .endpoint
            .post(url)
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;

        let token: TokenResponse = read_json(response).await?;
        Ok(token.into_session())
    }

    async fn sign_in(&self, email: &str, password: &str) -> ProviderResult<Session> {
        let url = self.token_url("password")?;
        let response = self
            .endpoint
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let token: TokenResponse = read_json(response).await?;
        Ok(token.into_session())
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: Option<&str>,
    ) -> ProviderResult<SignUpOutcome> {
        let url = Self::with_redirect(self.url("auth/v1/signup")?, redirect_to);
        let response = self
            .endpoint
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        // With autoconfirm the body is a token grant; otherwise it is the bare user.
        let body: Value = read_json(response).await?;
        if body.get("access_token").is_some() {
            let token: TokenResponse = serde_json::from_value(body)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
            let session = token.into_session();
            return Ok(SignUpOutcome {
                user: session.user.clone(),
                session: Some(session),
            });
        }

        let user: User = serde_json::from_value(body)
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;
        Ok(SignUpOutcome {
            user,
            session: None,
        })
    }

    async fn sign_out(&self, access_token: &str) -> ProviderResult<()> {
        let url = self.url("auth/v1/logout")?;
        let response = self
            .endpoint
            .post(url)
            .bearer_auth(access_token)
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }

    async fn reset_password(&self, email: &str, redirect_to: Option<&str>) -> ProviderResult<()> {
        let url = Self::with_redirect(self.url("auth/v1/recover")?, redirect_to);
        let response = self
            .endpoint
            .post(url)
            .json(&json!({ "email": email }))
            .send()
            .await?;

        ensure_success(response).await?;
        Ok(())
    }
}
