/*
 * Responsibility
 * - GET /api/v1/health (liveness)
 * - reports whether authentication is enforced or skipped; never calls a backend
 */
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::middleware::guard::Enforcement;
use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let auth = match state.auth.enforcement() {
        Enforcement::Enforced => "enforced",
        Enforcement::SkipAuth => "skipped",
    };
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "auth": auth,
            "catalog": state.catalog.backend_name(),
        })),
    )
}
