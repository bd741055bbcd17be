pub mod cookie;
pub mod events;
pub mod resolver;

pub use cookie::{CookieSettings, SessionCookie};
pub use events::{AuditLogObserver, SessionEvent, SessionEvents, SessionObserver};
pub use resolver::{Resolution, ResolveError, ResolverSettings, SessionResolver};
