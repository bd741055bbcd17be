/*
 * Responsibility
 * - the application-wide AppError
 * - IntoResponse (HTTP status + JSON error body)
 * - one conversion point for provider / catalog / validation errors
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::services::catalog::CatalogError;
use crate::services::identity::{AuthErrorKind, ProviderError};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// Local form validation; nothing was sent upstream.
    #[error("validation failed: {message}")]
    Validation { message: String },
    /// The identity provider refused the request (mapped to a user-facing message).
    #[error("authentication failed: {kind:?}")]
    Auth { kind: AuthErrorKind },
    #[error("unauthorized")]
    Unauthorized,
    #[error("not found: {resource}")]
    NotFound { resource: &'static str },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: &'static str },
    #[error("upstream service failed")]
    Upstream,
    #[error("internal server error")]
    Internal,
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &'static str) -> Self {
        Self::NotFound { resource }
    }

    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Validation { message } => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            }
            AppError::Auth { kind } => {
                let status = match kind {
                    AuthErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    AuthErrorKind::Unconfirmed => StatusCode::FORBIDDEN,
                    AuthErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                    AuthErrorKind::DuplicateAccount => StatusCode::CONFLICT,
                    AuthErrorKind::WeakPassword => StatusCode::UNPROCESSABLE_ENTITY,
                    AuthErrorKind::Unknown => StatusCode::BAD_REQUEST,
                };
                (status, kind.code(), kind.user_message().to_string())
            }
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "sign in required".into(),
            ),
            AppError::NotFound { resource } => (
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
                format!("{resource} not found."),
            ),
            AppError::ServiceUnavailable { message } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
                (*message).to_string(),
            ),
            AppError::Upstream => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                AuthErrorKind::Unknown.user_message().to_string(),
            ),
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_SERVER_ERROR",
                "internal server error".into(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        (status, Json(body)).into_response()
    }
}

impl From<ProviderError> for AppError {
    fn from(e: ProviderError) -> Self {
        if e.is_rejection() {
            AppError::Auth { kind: e.kind() }
        } else {
            AppError::Upstream
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(e: CatalogError) -> Self {
        match e {
            CatalogError::NotFound(_) => AppError::not_found("product"),
            CatalogError::Unavailable(_) | CatalogError::InvalidResponse(_) => AppError::Upstream,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_rejections_keep_their_kind() {
        let err = AppError::from(ProviderError::rejected(400, "Email not confirmed"));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(code, "EMAIL_NOT_CONFIRMED");
        assert_eq!(message, "Please confirm your email address before signing in.");
    }

    #[test]
    fn provider_outages_are_bad_gateway() {
        let err = AppError::from(ProviderError::Unavailable("connect refused".into()));
        assert_eq!(err.parts().0, StatusCode::BAD_GATEWAY);
        let err = AppError::from(ProviderError::rejected(500, "db down"));
        assert_eq!(err.parts().0, StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_product_is_not_found() {
        let err = AppError::from(CatalogError::NotFound(3));
        let (status, _, message) = err.parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(message, "product not found.");
    }
}
