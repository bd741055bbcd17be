/*
 * Responsibility
 * - identity types shared by the resolver, the guard and the auth handlers
 * - ProviderError: what the identity provider's error channel can tell us
 *
 * Notes
 * - Session carries bearer tokens; Debug never prints them
 */
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::messages::AuthErrorKind;

/// Identity embedded in a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

/// A provider-issued session. Owned by the identity provider; this service only
/// carries it between the cookie and the request.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub user: User,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user", &self.user)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Result of a sign-up: providers with email confirmation enabled return the
/// user without a session.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub user: User,
    pub session: Option<Session>,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    /// Transport failure: DNS, connect, TLS, client-side timeout.
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with a non-success status.
    #[error("identity provider returned {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("identity provider response could not be decoded: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// The provider looked at the request and said no (bad token, bad password, ...).
    ///
    /// 5xx answers are outages, not verdicts.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { status, .. } if *status < 500)
    }

    /// Classify the error for the user-facing message table.
    pub fn kind(&self) -> AuthErrorKind {
        match self {
            Self::Rejected { status: 429, .. } => AuthErrorKind::RateLimited,
            Self::Rejected { message, .. } => AuthErrorKind::from_provider_message(message),
            _ => AuthErrorKind::Unknown,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::InvalidResponse(e.to_string())
        } else {
            Self::Unavailable(e.to_string())
        }
    }
}
