/*
 * Responsibility
 * - request/response DTOs for /api/v1/auth/...
 * - validate(): local form checks; a failure never reaches the identity provider
 *
 * Notes
 * - emails are trimmed before validation and before use
 * - tokens never appear in responses; they only travel in the HttpOnly cookie
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::identity::{Session, User};

pub const MIN_PASSWORD_LEN: usize = 6;

fn validate_email(email: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() {
        return Err("Please enter your email address");
    }
    if !email.contains('@') {
        return Err("Please enter a valid email address");
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

impl SignInRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.is_empty() {
            return Err("Please enter your password");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err("Password must be at least 6 characters.");
        }
        if self.password != self.confirm_password {
            return Err("Passwords do not match");
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

impl ForgotPasswordRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        validate_email(&self.email)
    }
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub last_sign_in_at: Option<DateTime<Utc>>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            last_sign_in_at: user.last_sign_in_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    /// Unix seconds.
    pub expires_at: i64,
}

impl From<&Session> for SessionResponse {
    fn from(session: &Session) -> Self {
        Self {
            user: UserResponse::from(&session.user),
            expires_at: session.expires_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub user: UserResponse,
    /// `false` when the provider requires email confirmation first.
    pub signed_in: bool,
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign_up(email: &str, password: &str, confirm: &str) -> SignUpRequest {
        SignUpRequest {
            email: email.into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn email_must_be_present_and_contain_at() {
        let blank = ForgotPasswordRequest { email: "   ".into() };
        assert_eq!(blank.validate(), Err("Please enter your email address"));

        let no_at = ForgotPasswordRequest {
            email: "ada.example.com".into(),
        };
        assert_eq!(no_at.validate(), Err("Please enter a valid email address"));

        let ok = ForgotPasswordRequest {
            email: " ada@example.com ".into(),
        };
        assert_eq!(ok.validate(), Ok(()));
    }

    #[test]
    fn sign_in_needs_a_password() {
        let req = SignInRequest {
            email: "ada@example.com".into(),
            password: String::new(),
        };
        assert_eq!(req.validate(), Err("Please enter your password"));
    }

    #[test]
    fn sign_up_checks_length_then_confirmation() {
        assert_eq!(
            sign_up("ada@example.com", "12345", "12345").validate(),
            Err("Password must be at least 6 characters.")
        );
        assert_eq!(
            sign_up("ada@example.com", "123456", "1234567").validate(),
            Err("Passwords do not match")
        );
        assert_eq!(sign_up("ada@example.com", "123456", "123456").validate(), Ok(()));
    }

    #[test]
    fn sign_up_length_counts_characters_not_bytes() {
        assert_eq!(sign_up("a@b.c", "ééééé", "ééééé").validate(), Err("Password must be at least 6 characters."));
    }
}
