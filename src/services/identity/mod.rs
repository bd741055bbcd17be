pub mod client;
pub mod gotrue;
pub mod messages;
pub mod types;

pub use client::{IdentityProvider, ProviderResult};
pub use gotrue::GoTrueClient;
pub use messages::AuthErrorKind;
pub use types::{ProviderError, Session, SignUpOutcome, User};
