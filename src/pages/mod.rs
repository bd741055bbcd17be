/*
 * Responsibility
 * - site pages: home, catalog, dashboard, auth forms
 * - which of them need (or must not have) a session is decided by the route
 *   guard, not here
 */
pub mod handlers;
pub mod views;

use axum::{Router, routing::get};

use crate::api::v1::handlers::health::health;
use crate::state::AppState;

use handlers::{
    dashboard, forgot_password_form, home, list_products, login_form, product_detail, signup_form,
};

pub use handlers::not_found;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/products", get(list_products))
        .route("/products/{id}", get(product_detail))
        .route("/dashboard", get(dashboard))
        .route("/auth/login", get(login_form))
        .route("/auth/signup", get(signup_form))
        .route("/auth/forgot-password", get(forgot_password_form))
        .route("/health", get(health))
}
