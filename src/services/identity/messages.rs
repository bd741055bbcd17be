/*
 * Responsibility
 * - map the identity provider's error messages to a small fixed set of kinds
 * - user-facing strings and API error codes for each kind
 */

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    InvalidCredentials,
    Unconfirmed,
    RateLimited,
    DuplicateAccount,
    WeakPassword,
    Unknown,
}

const KNOWN_MESSAGES: &[(&str, AuthErrorKind)] = &[
    ("Invalid login credentials", AuthErrorKind::InvalidCredentials),
    ("Email not confirmed", AuthErrorKind::Unconfirmed),
    ("Too many requests", AuthErrorKind::RateLimited),
    ("User already registered", AuthErrorKind::DuplicateAccount),
    (
        "Password should be at least 6 characters",
        AuthErrorKind::WeakPassword,
    ),
];

impl AuthErrorKind {
    /// Case-insensitive containment, so trailing punctuation or prefixes added by
    /// the provider do not knock a message into `Unknown`.
    pub fn from_provider_message(message: &str) -> Self {
        let message = message.to_ascii_lowercase();
        KNOWN_MESSAGES
            .iter()
            .find(|(known, _)| message.contains(&known.to_ascii_lowercase()))
            .map(|(_, kind)| *kind)
            .unwrap_or(Self::Unknown)
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "Invalid email or password.",
            Self::Unconfirmed => "Please confirm your email address before signing in.",
            Self::RateLimited => "Too many attempts. Please wait a moment and try again.",
            Self::DuplicateAccount => "An account with this email already exists.",
            Self::WeakPassword => "Password must be at least 6 characters.",
            Self::Unknown => "An unexpected error occurred. Please try again.",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::Unconfirmed => "EMAIL_NOT_CONFIRMED",
            Self::RateLimited => "RATE_LIMITED",
            Self::DuplicateAccount => "DUPLICATE_ACCOUNT",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::Unknown => "AUTH_ERROR",
        }
    }
}
