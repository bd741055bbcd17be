/*
 * Responsibility
 * - /api/v1/auth/... handlers: sign in, sign up, password reset, sign out, current session
 * - DTO validation first (nothing reaches the provider on failure)
 * - provider call -> session cookie write/clear -> SessionEvent
 */
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};

use crate::{
    api::v1::{
        dto::auth::{
            ForgotPasswordRequest, MessageResponse, SessionResponse, SignInRequest, SignUpRequest,
            SignUpResponse, UserResponse,
        },
        extractors::CurrentUser,
    },
    error::AppError,
    services::{
        identity::Session,
        session::{
            SessionCookie, SessionEvent,
            cookie::{clear_session_cookie, read_session_cookie, session_cookie},
        },
    },
    state::AppState,
};

const CONFIRMATION_NOTICE: &str = "Check your email to confirm your account.";
const SIGNED_UP_NOTICE: &str = "Account created.";
const RESET_NOTICE: &str =
    "Password reset email sent! Please check your inbox and follow the instructions.";
const SIGNED_OUT_NOTICE: &str = "Signed out.";

const CONFIRM_PATH: &str = "/auth/callback";
const RESET_PATH: &str = "/auth/reset-password";

fn cookie_for(state: &AppState, session: &Session) -> Result<HeaderValue, AppError> {
    session_cookie(&state.cookies, &SessionCookie::from_session(session)).map_err(|e| {
        tracing::error!(error = %e, "session cookie could not be encoded");
        AppError::Internal
    })
}

fn cleared_cookie(state: &AppState) -> Result<HeaderValue, AppError> {
    clear_session_cookie(&state.cookies).map_err(|e| {
        tracing::error!(error = %e, "clearing cookie could not be encoded");
        AppError::Internal
    })
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> Result<Response, AppError> {
    req.validate().map_err(AppError::validation)?;

    let session = state
        .identity()?
        .sign_in(req.email.trim(), &req.password)
        .await?;
    let cookie = cookie_for(&state, &session)?;

    state
        .events
        .publish(&SessionEvent::SignedIn(session.user.clone()));

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cookie)],
        Json(SessionResponse::from(&session)),
    )
        .into_response())
}

pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> Result<Response, AppError> {
    req.validate().map_err(AppError::validation)?;

    let redirect_to = state.public_url(CONFIRM_PATH)?;
    let outcome = state
        .identity()?
        .sign_up(req.email.trim(), &req.password, Some(redirect_to.as_str()))
        .await?;

    state
        .events
        .publish(&SessionEvent::SignedUp(outcome.user.clone()));

    let body = SignUpResponse {
        user: UserResponse::from(&outcome.user),
        signed_in: outcome.session.is_some(),
        message: if outcome.session.is_some() {
            SIGNED_UP_NOTICE
        } else {
            CONFIRMATION_NOTICE
        },
    };
    let mut response = (StatusCode::CREATED, Json(body)).into_response();

    // Confirmation-required providers return no session yet.
    if let Some(session) = &outcome.session {
        response
            .headers_mut()
            .append(SET_COOKIE, cookie_for(&state, session)?);
        state
            .events
            .publish(&SessionEvent::SignedIn(session.user.clone()));
    }

    Ok(response)
}

pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    req.validate().map_err(AppError::validation)?;

    let redirect_to = state.public_url(RESET_PATH)?;
    state
        .identity()?
        .reset_password(req.email.trim(), Some(redirect_to.as_str()))
        .await?;

    state.events.publish(&SessionEvent::PasswordResetRequested);

    Ok(Json(MessageResponse {
        message: RESET_NOTICE,
    }))
}

/// Always clears the cookie. Provider-side revocation is best effort.
pub async fn sign_out(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    if let (Some(cookie), Ok(provider)) = (read_session_cookie(&headers), state.identity())
        && let Err(e) = provider.sign_out(&cookie.access_token).await
    {
        tracing::warn!(
            error = %e,
            provider = provider.backend_name(),
            "provider sign-out failed; clearing cookie anyway"
        );
    }

    state.events.publish(&SessionEvent::SignedOut);

    Ok((
        StatusCode::OK,
        [(SET_COOKIE, cleared_cookie(&state)?)],
        Json(MessageResponse {
            message: SIGNED_OUT_NOTICE,
        }),
    )
        .into_response())
}

pub async fn session(CurrentUser(session): CurrentUser) -> Json<SessionResponse> {
    Json(SessionResponse::from(&session))
}
