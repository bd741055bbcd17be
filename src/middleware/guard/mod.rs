/*
 * Responsibility
 * - session-aware route guard
 *   - policy: path classification + decision table (pure)
 *   - route_guard: axum middleware that resolves the session and applies the decision
 */
pub mod policy;
pub mod route_guard;

pub use policy::{Enforcement, GuardAction, RouteClass, RoutePolicy, guard};
