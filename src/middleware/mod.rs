/*
 * Responsibility
 * - public interface of the middleware layers
 * - each module exposes `apply(router, ...) -> Router`
 */
pub mod cors;
pub mod guard;
pub mod http;
pub mod security_headers;
