/*
 * Responsibility
 * - hand the guard-attached Session to handlers that need an identity
 * - the guard fails open on provider outages, so this is the real check:
 *   no session in extensions => 401
 * - MaybeUser: same lookup for pages that only adapt to a visitor
 */
use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::AppError;
use crate::services::identity::Session;

#[derive(Debug, Clone)]
pub struct CurrentUser(pub Session);

impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Session>()
            .cloned()
            .map(CurrentUser)
            .ok_or(AppError::Unauthorized)
    }
}

/// The session if the guard attached one. Never rejects.
#[derive(Debug, Clone, Default)]
pub struct MaybeUser(pub Option<Session>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(parts.extensions.get::<Session>().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::Request;
    use uuid::Uuid;

    use super::*;
    use crate::services::identity::User;

    #[tokio::test]
    async fn missing_session_is_unauthorized() {
        let (mut parts, _) = Request::new(()).into_parts();
        let err = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn attached_session_is_returned() {
        let (mut parts, _) = Request::new(()).into_parts();
        parts.extensions.insert(Session {
            access_token: "a".into(),
            refresh_token: "r".into(),
            expires_at: 0,
            user: User {
                id: Uuid::from_u128(1),
                email: "ada@example.com".into(),
                last_sign_in_at: None,
            },
        });

        let CurrentUser(session) = CurrentUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(session.user.email, "ada@example.com");

        let MaybeUser(maybe) = MaybeUser::from_request_parts(&mut parts, &()).await.unwrap();
        assert!(maybe.is_some());
    }
}
