//! Route guard middleware: session lookup → classification → pass-through or 302.
//!
//! Apply it to the whole site (pages + API) *after* routes and the fallback are
//! registered, otherwise unknown `/dashboard/...` paths would bypass it.
//!
//! ```ignore
//! let router = Router::new().merge(pages::routes()).fallback(not_found);
//! let router = middleware::guard::route_guard::apply(router, state.clone());
//! ```
//!
//! Failure policy is availability-first: if the session lookup fails (provider
//! outage, timeout) the request continues without a session and a warning is
//! logged. Handlers that need an identity re-check via `CurrentUser`.
//!
//! A refreshed or cleared cookie from the lookup is appended to the response
//! unless the handler already set the session cookie itself.

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};

use crate::middleware::guard::policy::{GuardAction, guard};
use crate::services::session::Resolution;
use crate::services::session::cookie::sets_session_cookie;
use crate::state::{AuthMode, AppState};

pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    router.layer(middleware::from_fn_with_state(state, route_guard_middleware))
}

async fn route_guard_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let AuthMode::Enforced { resolver, .. } = &state.auth else {
        return next.run(req).await;
    };

    let path = req.uri().path().to_owned();

    // Assets never cost a provider round trip.
    if state.policy.is_excluded(&path) {
        return next.run(req).await;
    }

    let Resolution {
        session,
        set_cookie,
    } = match resolver.try_resolve(req.headers()).await {
        Ok(resolution) => resolution,
        Err(err) => {
            tracing::warn!(
                error = %err,
                path = %path,
                "session lookup failed; letting request through unauthenticated"
            );
            return next.run(req).await;
        }
    };

    let action = guard(
        &state.policy,
        state.auth.enforcement(),
        &path,
        session.as_ref(),
    );

    let mut response = match action {
        GuardAction::RedirectTo(target) => {
            tracing::debug!(path = %path, location = target, "route guard redirect");
            redirect(target)
        }
        GuardAction::Continue => {
            // middleware → extractor (CurrentUser)
            if let Some(session) = session {
                req.extensions_mut().insert(session);
            }
            next.run(req).await
        }
    };

    // A handler that wrote or cleared the session (sign in, sign out) wins
    // over the resolver's refresh or clear.
    if let Some(cookie) = set_cookie {
        if !sets_session_cookie(response.headers()) {
            response.headers_mut().append(header::SET_COOKIE, cookie);
        }
    }

    response
}

/// `302 Found` (axum's `Redirect` only offers 303/307/308).
fn redirect(target: &'static str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, target)]).into_response()
}
