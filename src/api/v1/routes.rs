/*
 * Responsibility
 * - URL structure of /api/v1
 * - /health and the credential flows under /auth
 * - the route guard is applied by app::router, not here
 */
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use crate::api::v1::handlers::{
    auth::{forgot_password, session, sign_in, sign_out, sign_up},
    health::health,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signin", post(sign_in))
        .route("/signup", post(sign_up))
        .route("/forgot-password", post(forgot_password))
        .route("/signout", post(sign_out))
        .route("/session", get(session))
}
