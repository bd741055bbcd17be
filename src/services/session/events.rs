/*
 * Responsibility
 * - session-change notifications (sign-in / sign-up / sign-out / refresh / reset)
 * - explicit observer list owned by AppState; no process-wide "current user"
 */
use std::fmt;
use std::sync::Arc;

use crate::services::identity::User;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn(User),
    SignedUp(User),
    SignedOut,
    Refreshed(User),
    PasswordResetRequested,
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SignedIn(_) => "signed_in",
            Self::SignedUp(_) => "signed_up",
            Self::SignedOut => "signed_out",
            Self::Refreshed(_) => "refreshed",
            Self::PasswordResetRequested => "password_reset_requested",
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::SignedIn(user) | Self::SignedUp(user) | Self::Refreshed(user) => Some(user),
            Self::SignedOut | Self::PasswordResetRequested => None,
        }
    }
}

/// Receives session events. Called inline on the request task, so keep it cheap.
pub trait SessionObserver: Send + Sync + 'static {
    fn on_session_event(&self, event: &SessionEvent);
}

/// Observer list. Built once at startup, then shared read-only.
#[derive(Clone, Default)]
pub struct SessionEvents {
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.subscribe(observer);
        self
    }

    pub fn subscribe(&mut self, observer: Arc<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn publish(&self, event: &SessionEvent) {
        for observer in &self.observers {
            observer.on_session_event(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionEvents")
            .field("observers", &self.observers.len())
            .finish()
    }
}

/// Writes one structured audit line per event.
#[derive(Debug, Default)]
pub struct AuditLogObserver;

impl SessionObserver for AuditLogObserver {
    fn on_session_event(&self, event: &SessionEvent) {
        match event.user() {
            Some(user) => tracing::info!(event = event.name(), user_id = %user.id, "session event"),
            None => tracing::info!(event = event.name(), "session event"),
        }
    }
}
